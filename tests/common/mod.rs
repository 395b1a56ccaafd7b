#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::{json, Value};
use std::fs;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub work: PathBuf,
    cargo_home: PathBuf,
    rustup_home: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let work = tmp.path().join("work");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&work).expect("create work dir");

        let orig_home = std::env::var("HOME").unwrap_or_default();
        let cargo_home = PathBuf::from(&orig_home).join(".cargo");
        let rustup_home = PathBuf::from(&orig_home).join(".rustup");

        Self {
            _tmp: tmp,
            home,
            work,
            cargo_home,
            rustup_home,
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home.join(".config/alulca")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("alulca");
        cmd.env("HOME", &self.home)
            .env("CARGO_HOME", &self.cargo_home)
            .env("RUSTUP_HOME", &self.rustup_home)
            .env_remove("ALULCA_API_BASE")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn run_json_api(&self, api: &str, args: &[&str]) -> Value {
        let mut cmd = self.cmd();
        let out = cmd
            .arg("--json")
            .arg("--api")
            .arg(api)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }

    pub fn write_file(&self, name: &str, body: &str) -> PathBuf {
        let path = self.work.join(name);
        fs::write(&path, body).expect("write fixture file");
        path
    }
}

/// Canned `/dashboard/stages` response shaped like the real service's:
/// five stages at both scopes, totals computed from them.
pub fn stages_body(route: &str, units: u64) -> Value {
    let (carbon, electricity, cost, quality) = if route == "conventional" {
        (3.16, 9.04, 57.9, 0.85)
    } else {
        (1.68, 5.74, 39.75, 0.8)
    };
    let splits = [0.2, 0.3, 0.2, 0.15, 0.15];
    let names = [
        "Casting primary aluminium",
        "Hot rolling",
        "Cold rolling",
        "Heat treatment and tempers",
        "Finishing and surface treatment",
    ];

    let mut stages = Vec::new();
    for (scope, n) in [("per_unit", 1u64), ("total", units)] {
        let k = n as f64;
        for (name, share) in names.iter().zip(splits) {
            stages.push(json!({
                "stage": name,
                "scope": scope,
                "per_unit": scope == "per_unit",
                "units": n,
                "quality_score": quality,
                "electricity_kwh": electricity * share * k,
                "carbon_kgco2e": carbon * share * k,
                "naturalGas_nm3": 0.05 * share * k,
                "wastewater_l": 1.5 * share * k,
                "manufacturing_cost_per_unit_usd": cost * share * k,
                "transport_cost_usd": 0.1 * share * k
            }));
        }
    }

    let totals = |scope: &str, n: u64| {
        let rows: Vec<&Value> = stages.iter().filter(|s| s["scope"] == scope).collect();
        let sum = |key: &str| rows.iter().map(|r| r[key].as_f64().unwrap()).sum::<f64>();
        json!({
            "scope": scope,
            "units": n,
            "manufacturing_cost_per_unit": sum("manufacturing_cost_per_unit_usd"),
            "electricity_kwh": sum("electricity_kwh"),
            "carbon_kgco2e": sum("carbon_kgco2e"),
            "naturalGas_nm3": sum("naturalGas_nm3"),
            "wastewater_l": sum("wastewater_l"),
            "transport_cost_usd": sum("transport_cost_usd"),
            "Quality_Score": quality
        })
    };
    let per_unit = totals("per_unit", 1);
    let total = totals("total", units);

    json!({
        "stages": stages,
        "totals": {"per_unit": per_unit, "total": total},
        "baselines_used": {"electricity_kwh": 12.0, "carbon_kgco2e": 8.0},
        "data_csv": "data/processed/train.csv"
    })
}

pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(body: &Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Local stand-in for the calculation API serving a fixed number of requests.
pub struct StubApi {
    addr: SocketAddr,
    join: JoinHandle<()>,
    pub requests: Arc<Mutex<Vec<Value>>>,
}

impl StubApi {
    pub fn start(
        expected: usize,
        respond: impl Fn(&Value) -> Reply + Send + 'static,
    ) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind server");
        let addr = listener.local_addr().expect("server addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);
        let join = thread::spawn(move || {
            for _ in 0..expected {
                let (mut stream, _) = listener.accept().expect("accept");
                let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
                let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
                let body = read_request_body(&mut stream);
                let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                let reply = respond(&payload);
                seen.lock().expect("requests lock").push(payload);
                write_reply(&mut stream, &reply);
            }
        });
        Self {
            addr,
            join,
            requests,
        }
    }

    /// Answers every stages request with the canned body for its route.
    pub fn stages(expected: usize) -> Self {
        Self::start(expected, |payload| {
            let route = payload["route_type"].as_str().unwrap_or("conventional");
            let units = payload["units"].as_u64().unwrap_or(1);
            Reply::json(&stages_body(route, units))
        })
    }

    pub fn base(&self) -> String {
        format!("http://127.0.0.1:{}", self.addr.port())
    }

    pub fn finish(self) -> Vec<Value> {
        self.join.join().expect("server thread");
        let requests = self.requests.lock().expect("requests lock");
        requests.clone()
    }
}

/// Base URL of a port nothing is listening on.
pub fn dead_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let port = listener.local_addr().expect("probe addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn read_request_body(stream: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut scratch = [0u8; 4096];
    loop {
        match stream.read(&mut scratch) {
            Ok(0) | Err(_) => return Vec::new(),
            Ok(n) => {
                buf.extend_from_slice(&scratch[..n]);
                if let Some(headers_end) = find_double_crlf(&buf) {
                    let body_len = parse_content_length(&buf[..headers_end]).unwrap_or(0);
                    while buf.len() < headers_end + body_len {
                        match stream.read(&mut scratch) {
                            Ok(0) | Err(_) => break,
                            Ok(n) => buf.extend_from_slice(&scratch[..n]),
                        }
                    }
                    let end = (headers_end + body_len).min(buf.len());
                    return buf[headers_end..end].to_vec();
                }
            }
        }
    }
}

fn find_double_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

fn parse_content_length(headers: &[u8]) -> Option<usize> {
    let text = String::from_utf8_lossy(headers);
    text.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

fn write_reply(stream: &mut TcpStream, reply: &Reply) {
    let reason = if reply.status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
