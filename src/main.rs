fn main() -> Result<(), Box<dyn std::error::Error>> {
    murmur::cli::main()
}
