//! keycred - register custom signing keys on Entra ID service principals.

use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    keycred_cli::run().await
}
