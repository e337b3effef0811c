fn main() {
    burrow::game::run();
}
