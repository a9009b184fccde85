fn main() {
    keyfence::run()
}
