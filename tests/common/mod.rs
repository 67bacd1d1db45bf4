// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::{
    collections::BTreeMap,
    fs,
    io::{BufRead, BufReader, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream},
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver},
    thread,
    time::Duration,
};

/// Single request seen by [`MockDav`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// WebDAV endpoint that records every request, and answers with a fixed status.
pub struct MockDav {
    addr: SocketAddr,
    requests: Receiver<Recorded>,
}

impl MockDav {
    pub fn answering(status: u16) -> Result<Self> {
        Self::answering_with(status, &[])
    }

    pub fn answering_with(status: u16, headers: &[(&str, &str)]) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let (sender, requests) = mpsc::channel();
        let extra: String = headers
            .iter()
            .map(|(key, value)| format!("{key}: {value}\r\n"))
            .collect();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                match serve(stream, status, &extra) {
                    Ok(recorded) => {
                        if sender.send(recorded).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            }
        });

        Ok(Self { addr, requests })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn received(&self) -> Result<Recorded> {
        self.requests
            .recv_timeout(Duration::from_secs(10))
            .context("mock WebDAV server saw no request")
    }

    /// Check that no further request arrives within a short grace period.
    pub fn saw_nothing_more(&self) -> bool {
        self.requests
            .recv_timeout(Duration::from_millis(500))
            .is_err()
    }
}

fn serve(stream: TcpStream, status: u16, extra: &str) -> Result<Recorded> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut line = String::new();
    reader.read_line(&mut line)?;
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        line.clear();
        reader.read_line(&mut line)?;
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((key, value)) = header.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;

    let mut stream = stream;
    write!(
        stream,
        "HTTP/1.1 {status} Mock\r\n{extra}Content-Length: 0\r\nConnection: close\r\n\r\n"
    )?;
    stream.flush()?;

    Ok(Recorded {
        method,
        path,
        headers,
        body,
    })
}

/// Unpack gzip tarball into entry name and contents.
pub fn unpack(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    let mut entries = BTreeMap::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry
            .path()?
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        entries.insert(name, contents);
    }

    Ok(entries)
}

/// List backup archives staged in target directory.
pub fn staged_archives(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.to_string_lossy().ends_with(".tar.gz") {
            archives.push(path);
        }
    }

    Ok(archives)
}
