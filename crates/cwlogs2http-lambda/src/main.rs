// AWS Lambda binary entry point
//
// Build with: cargo build -p cwlogs2http-lambda --release
// The function handler name is irrelevant; the runtime looks for `bootstrap`.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    cwlogs2http_lambda::run().await
}
