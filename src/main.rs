fn main() {
    govariant::cli::run();
}
