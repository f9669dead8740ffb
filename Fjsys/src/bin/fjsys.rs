fn main() -> anyhow::Result<()> {
    fjsys::cli::run_cli()
}
