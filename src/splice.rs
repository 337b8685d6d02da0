//! The copy-and-wait shutdown idiom shared by both proxy workers: two
//! concurrent copiers, one per direction; when either side's copy loop
//! exits (EOF or error), both halves are shut down, and both copy tasks are
//! always awaited before returning. This is deliberately stricter than a
//! `tokio::select!` over two `tokio::io::copy` calls, which abandons
//! whichever copier didn't finish first.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::AgentError;

/// Splice two duplex streams together until either direction closes, then
/// shut down and drain both. Returns the first I/O error observed, if any.
pub async fn bidirectional<A, B>(a: A, b: B) -> Result<(), AgentError>
where
    A: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    B: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut a_read, mut a_write) = tokio::io::split(a);
    let (mut b_read, mut b_write) = tokio::io::split(b);

    let a_to_b = tokio::spawn(async move {
        let result = tokio::io::copy(&mut a_read, &mut b_write).await;
        let _ = b_write.shutdown().await;
        result
    });
    let b_to_a = tokio::spawn(async move {
        let result = tokio::io::copy(&mut b_read, &mut a_write).await;
        let _ = a_write.shutdown().await;
        result
    });

    let (r1, r2) = tokio::join!(a_to_b, b_to_a);

    // Join errors only occur if a copy task panicked; surface as I/O-ish.
    let r1 = r1.map_err(|e| AgentError::SpliceIo(std::io::Error::other(e.to_string())))?;
    let r2 = r2.map_err(|e| AgentError::SpliceIo(std::io::Error::other(e.to_string())))?;

    r1?;
    r2?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt as _};

    #[tokio::test]
    async fn bytes_flow_in_both_directions() {
        let (client_a, mut test_a) = tokio::io::duplex(64);
        let (client_b, mut test_b) = tokio::io::duplex(64);

        let splice = tokio::spawn(bidirectional(client_a, client_b));

        test_a.write_all(b"hello from a").await.unwrap();
        let mut buf = [0u8; 12];
        test_b.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello from a");

        test_b.write_all(b"hello from b").await.unwrap();
        let mut buf = [0u8; 12];
        test_a.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello from b");

        drop(test_a);
        drop(test_b);
        splice.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn closing_one_end_unblocks_the_whole_splice() {
        let (client_a, test_a) = tokio::io::duplex(64);
        let (client_b, test_b) = tokio::io::duplex(64);

        let splice = tokio::spawn(bidirectional(client_a, client_b));

        drop(test_a);
        drop(test_b);

        let result = tokio::time::timeout(std::time::Duration::from_secs(1), splice)
            .await
            .expect("splice should finish promptly once both ends are dropped");
        result.unwrap().unwrap();
    }
}
