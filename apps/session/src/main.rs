fn main() -> anyhow::Result<()> {
    drill_session::run()
}
