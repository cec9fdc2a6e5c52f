fn main() -> anyhow::Result<()> {
    phyloflow::run()
}
