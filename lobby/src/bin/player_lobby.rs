use lobby::domain::Role;
use lobby::frameworks::server;

#[tokio::main]
async fn main() {
    server::run(Role::Player).await;
}
