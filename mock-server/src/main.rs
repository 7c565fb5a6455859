use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let omdb_port = std::env::var("OMDB_PORT").unwrap_or_else(|_| "3001".to_string());
    let api_key = std::env::var("OMDB_API_KEY").unwrap_or_else(|_| "test-key".to_string());

    let testrail = mock_server::FakeTestRail::new()
        .with_case(4, "Search returns more than 30 items")
        .with_case(5, "Search contains STEM titles");
    let testrail_addr = format!("127.0.0.1:{port}");
    let omdb_addr = format!("127.0.0.1:{omdb_port}");
    let testrail_listener = TcpListener::bind(&testrail_addr).await?;
    let omdb_listener = TcpListener::bind(&omdb_addr).await?;
    println!("TestRail fake listening on {testrail_addr}, OMDb fake on {omdb_addr}");

    tokio::try_join!(
        mock_server::run(testrail_listener, testrail.router()),
        mock_server::run(omdb_listener, mock_server::omdb::router(&api_key)),
    )?;
    Ok(())
}
