#[tokio::main]
async fn main() {
    store::run().await;
}
