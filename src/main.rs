fn main() -> anyhow::Result<()> {
    chatlog_md::cli::run()
}
