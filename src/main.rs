fn main() -> Result<(), Box<dyn std::error::Error>> {
    nero::cli::main()
}
