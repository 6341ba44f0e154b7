fn main() {
    labbench::cli::run();
}
