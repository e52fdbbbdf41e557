//! Integration test support for Fashion Store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fashion-store-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - File-backed carts across store instances
//! - `checkout_handoff` - Checkout client against a local HTTP responder

use fashion_store_core::{CartItem, Price, ProductSnapshot};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// A product snapshot with the usual fashion variants.
#[must_use]
pub fn product(id: &str, title: &str, cents: i64) -> ProductSnapshot {
    let mut product = ProductSnapshot::new(id, title, Price::from_cents(cents));
    product.colors = vec!["red".to_owned(), "blue".to_owned()];
    product.sizes = vec!["S".to_owned(), "M".to_owned(), "L".to_owned()];
    product.media = vec![format!("https://cdn.example.com/{id}.jpg")];
    product
}

/// A red/M line of `product`.
#[must_use]
pub fn red_medium(product: &ProductSnapshot, quantity: u32) -> CartItem {
    CartItem::new(product.clone(), quantity)
        .with_color("red")
        .with_size("M")
}

/// One HTTP request as seen by [`serve_once`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// e.g. `POST /api/checkout HTTP/1.1`
    pub request_line: String,
    /// Raw request body.
    pub body: String,
}

/// Answer exactly one HTTP request with `status` and a JSON `body`.
///
/// Returns the base URL to point a client at and a handle resolving to the
/// captured request.
///
/// # Errors
///
/// Returns an error if the listener can't bind.
pub async fn serve_once(
    status: u16,
    body: &'static str,
) -> std::io::Result<(Url, JoinHandle<std::io::Result<CapturedRequest>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let base = Url::parse(&format!("http://{addr}/api/"))
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await?;
        let request = read_request(&mut socket).await?;

        let response = format!(
            "HTTP/1.1 {status} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await?;
        socket.shutdown().await?;
        Ok(request)
    });

    Ok((base, handle))
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> std::io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(chunk.get(..n).unwrap_or_default());
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(buf.get(..header_end).unwrap_or_default()).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(chunk.get(..n).unwrap_or_default());
    }

    Ok(CapturedRequest {
        request_line: head.lines().next().unwrap_or_default().to_owned(),
        body: String::from_utf8_lossy(buf.get(header_end..).unwrap_or_default()).into_owned(),
    })
}
