use corvid::uci::UciEngine;

fn main() {
    env_logger::init();
    UciEngine::new().run();
}
