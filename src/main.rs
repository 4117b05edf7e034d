fn main() {
    if let Err(e) = pitchperfect_lib::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
