use rstest::fixture;
use tracing::info;

mod test_server;
pub use self::test_server::*;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

#[fixture]
pub fn server() -> TestServer {
    init_tracing();
    match TestServer::start() {
        Ok(server) => server,
        Err(error) => {
            panic!("fail to start test server: {error:?}");
        }
    }
}
