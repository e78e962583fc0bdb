fn main() -> anyhow::Result<()> {
    reflect_ngin::run(reflect_ngin::SceneConfig::default())
}
