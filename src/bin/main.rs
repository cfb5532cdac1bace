fn main() {
    env_logger::init();
    corvid::uci::run();
}
