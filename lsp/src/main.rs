mod server;

#[cfg(test)]
mod inlay_hint_test;

#[tokio::main]
async fn main() {
    server::run().await;
}
