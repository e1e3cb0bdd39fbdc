fn main() -> anyhow::Result<()> {
    gmp_filter::run()
}
