//! Minimal in-process Redis speaking RESP2, for exercising `RedisCache`
//! without a real server. Handles `PING`, `GET`, `PSETEX`; answers `+OK`
//! to anything else. Commands can be made to fail or to never answer.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

#[derive(Default)]
struct Shared {
    store: Mutex<HashMap<String, String>>,
    commands: Mutex<Vec<Vec<String>>>,
    silent: HashSet<String>,
    failing: HashSet<String>,
}

#[derive(Default)]
pub struct FakeRedisBuilder {
    silent: HashSet<String>,
    failing: HashSet<String>,
}

impl FakeRedisBuilder {
    /// Read the command but never reply.
    pub fn silent(mut self, command: &str) -> Self {
        self.silent.insert(command.to_ascii_uppercase());
        self
    }

    /// Reply with `-ERR`.
    pub fn failing(mut self, command: &str) -> Self {
        self.failing.insert(command.to_ascii_uppercase());
        self
    }

    pub async fn spawn(self) -> FakeRedis {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shared = Arc::new(Shared {
            silent: self.silent,
            failing: self.failing,
            ..Shared::default()
        });

        let accept_shared = shared.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, accept_shared.clone()));
            }
        });

        FakeRedis { addr, shared }
    }
}

pub struct FakeRedis {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl FakeRedis {
    pub fn builder() -> FakeRedisBuilder {
        FakeRedisBuilder::default()
    }

    pub async fn spawn() -> Self {
        Self::builder().spawn().await
    }

    pub fn url(&self) -> String {
        format!("redis://{}", self.addr)
    }

    /// The most recent command named `name`, with its arguments.
    pub fn last(&self, name: &str) -> Option<Vec<String>> {
        self.shared
            .commands
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|c| c[0].eq_ignore_ascii_case(name))
            .cloned()
    }
}

async fn serve(stream: TcpStream, shared: Arc<Shared>) {
    let (read, mut write) = stream.into_split();
    let mut reader = BufReader::new(read);

    while let Some(command) = read_command(&mut reader).await {
        shared.commands.lock().unwrap().push(command.clone());
        let name = command[0].to_ascii_uppercase();

        if shared.silent.contains(&name) {
            continue;
        }
        let reply = if shared.failing.contains(&name) {
            "-ERR injected failure\r\n".to_string()
        } else {
            reply_to(&name, &command, &shared)
        };
        if send(&mut write, &reply).await.is_err() {
            return;
        }
    }
}

fn reply_to(name: &str, command: &[String], shared: &Shared) -> String {
    let mut store = shared.store.lock().unwrap();
    match (name, command) {
        ("PING", _) => "+PONG\r\n".to_string(),
        ("GET", [_, key]) => match store.get(key) {
            Some(value) => format!("${}\r\n{}\r\n", value.len(), value),
            None => "$-1\r\n".to_string(),
        },
        ("PSETEX", [_, key, _millis, value]) => {
            store.insert(key.clone(), value.clone());
            "+OK\r\n".to_string()
        }
        _ => "+OK\r\n".to_string(),
    }
}

async fn send<W: AsyncWrite + Unpin>(write: &mut W, reply: &str) -> std::io::Result<()> {
    write.write_all(reply.as_bytes()).await?;
    write.flush().await
}

/// Reads one `*N` array of `$len` bulk strings; `None` on EOF or garbage.
async fn read_command<R>(reader: &mut R) -> Option<Vec<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    let mut line = String::new();
    if reader.read_line(&mut line).await.ok()? == 0 {
        return None;
    }
    let count: usize = line.trim_end().strip_prefix('*')?.parse().ok()?;

    let mut args = Vec::with_capacity(count);
    for _ in 0..count {
        line.clear();
        reader.read_line(&mut line).await.ok()?;
        let len: usize = line.trim_end().strip_prefix('$')?.parse().ok()?;
        let mut buf = vec![0u8; len + 2];
        reader.read_exact(&mut buf).await.ok()?;
        buf.truncate(len);
        args.push(String::from_utf8(buf).ok()?);
    }
    (!args.is_empty()).then_some(args)
}
