fn main() -> Result<(), Box<dyn std::error::Error>> {
    genero_cli::run()
}
