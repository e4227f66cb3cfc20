#[tokio::main]
async fn main() {
    grooming_backend::run().await;
}
