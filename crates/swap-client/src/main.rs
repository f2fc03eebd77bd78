#[tokio::main]
async fn main() -> std::process::ExitCode {
    swap_client::start(std::env::args()).await
}
