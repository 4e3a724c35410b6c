use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::{Edns, Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record, RecordType};
use spectral::prelude::*;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use nsbench::benchmark::{Benchmark, BenchmarkOpts};
use nsbench::nameserver::{NameServerConfig, NameServerConfigGroup};
use nsbench::resolver::{Job, QueryError, QueryExecutor, UdpExecutor, UdpExecutorOpts};
use nsbench::statistics::ranking::Ranking;

#[derive(Debug, Clone, Copy)]
struct Responder {
    /// Answer with an OPT record if the request carries one
    edns: bool,
    /// Never answer at all
    silent: bool,
}

impl Responder {
    fn answering() -> Responder {
        Responder {
            edns: true,
            silent: false,
        }
    }

    fn without_edns() -> Responder {
        Responder {
            edns: false,
            silent: false,
        }
    }

    fn silent() -> Responder {
        Responder {
            edns: false,
            silent: true,
        }
    }

    async fn start(self) -> (SocketAddr, JoinHandle<()>) {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = socket.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
                if self.silent {
                    continue;
                }
                let request = match Message::from_vec(&buf[..len]) {
                    Ok(request) => request,
                    Err(_) => continue,
                };
                let response = self.respond(&request).to_vec().unwrap();
                socket.send_to(&response, peer).await.unwrap();
            }
        });

        (addr, handle)
    }

    fn respond(&self, request: &Message) -> Message {
        let mut response = Message::new();
        response
            .set_id(request.id())
            .set_message_type(MessageType::Response)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true);

        let query = request.queries()[0].clone();
        if query.name().to_string().starts_with("nx.") {
            response.set_response_code(ResponseCode::NXDomain);
        } else if query.query_type() == RecordType::A {
            let record = Record::from_rdata(query.name().clone(), 300, RData::A(A::new(192, 0, 2, 1)));
            response.add_answer(record);
        }
        response.add_query(query);

        if self.edns && request.extensions().is_some() {
            let mut edns = Edns::new();
            edns.set_max_payload(4096);
            edns.set_dnssec_ok(true);
            response.set_edns(edns);
        }

        response
    }
}

fn executor(timeout: Duration) -> UdpExecutor {
    UdpExecutor::new(UdpExecutorOpts {
        timeout,
        ..Default::default()
    })
}

fn job(addr: SocketAddr, record_type: &str, name: &str, extended_validation: bool) -> Job {
    Job::new(
        Arc::new(NameServerConfig::udp(addr)),
        record_type,
        name,
        extended_validation,
        CancellationToken::new(),
    )
}

#[tokio::test]
async fn a_record_round_trip() {
    let (addr, responder) = Responder::answering().start().await;

    let outcome = executor(Duration::from_secs(2))
        .execute(&job(addr, "A", "example.com.", false))
        .await;
    responder.abort();

    let exchange = outcome.unwrap();
    assert_that(&exchange.answers).has_length(1);
    assert_that(&exchange.answers[0].name()).is_equal_to("example.com.");
    assert_that(&exchange.answers[0].value()).is_equal_to("192.0.2.1");
    assert_that(&exchange.degraded).is_false();
}

#[tokio::test]
async fn response_code_is_not_a_failure() {
    let (addr, responder) = Responder::answering().start().await;

    let outcome = executor(Duration::from_secs(2))
        .execute(&job(addr, "A", "nx.example.com.", false))
        .await;
    responder.abort();

    let exchange = outcome.unwrap();
    assert_that(&exchange.answers).is_empty();
    assert_that(&exchange.response_code).is_equal_to(ResponseCode::NXDomain.to_string());
}

#[tokio::test]
async fn extended_validation_supported() {
    let (addr, responder) = Responder::answering().start().await;

    let outcome = executor(Duration::from_secs(2))
        .execute(&job(addr, "A", "example.com.", true))
        .await;
    responder.abort();

    assert_that(&outcome.unwrap().degraded).is_false();
}

#[tokio::test]
async fn extended_validation_not_supported_is_degraded() {
    let (addr, responder) = Responder::without_edns().start().await;

    let outcome = executor(Duration::from_secs(2))
        .execute(&job(addr, "A", "example.com.", true))
        .await;
    responder.abort();

    let exchange = outcome.unwrap();
    assert_that(&exchange.degraded).is_true();
    assert_that(&exchange.answers).has_length(1);
}

#[tokio::test]
async fn silent_nameserver_times_out() {
    let (addr, responder) = Responder::silent().start().await;
    let timeout = Duration::from_millis(200);

    let outcome = executor(timeout).execute(&job(addr, "A", "example.com.", false)).await;
    responder.abort();

    let failure = outcome.unwrap_err();
    assert_that(&failure.error).is_equal_to(QueryError::Timeout);
    assert_that(&(failure.elapsed >= timeout)).is_true();
}

#[tokio::test]
async fn cancellation_aborts_exchange() {
    let (addr, responder) = Responder::silent().start().await;
    let cancellation = CancellationToken::new();
    let job = Job::new(
        Arc::new(NameServerConfig::udp(addr)),
        "A",
        "example.com.",
        false,
        cancellation.clone(),
    );

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancellation.cancel();
    });
    let outcome = executor(Duration::from_secs(10)).execute(&job).await;
    canceller.await.unwrap();
    responder.abort();

    let failure = outcome.unwrap_err();
    assert_that(&failure.error).is_equal_to(QueryError::Cancelled);
    assert_that(&(failure.elapsed < Duration::from_secs(10))).is_true();
}

#[tokio::test]
async fn benchmark_and_ranking() {
    let (fast, fast_responder) = Responder::answering().start().await;
    let (silent, silent_responder) = Responder::silent().start().await;
    let name_servers = NameServerConfigGroup::new(vec![NameServerConfig::udp(silent), NameServerConfig::udp(fast)]);
    let domains = vec![
        "example.com".to_string(),
        "example.org".to_string(),
        "example.net".to_string(),
        "example.com".to_string(),
    ];
    let opts = BenchmarkOpts {
        workers: 4,
        ..Default::default()
    };
    let benchmark = Benchmark::new(executor(Duration::from_millis(300)), opts);

    let results = benchmark
        .run(&name_servers, &domains, &CancellationToken::new())
        .await
        .unwrap();
    fast_responder.abort();
    silent_responder.abort();

    assert_that(&results.len()).is_equal_to(2);
    assert_that(&results.domains().len()).is_equal_to(3);
    for (_, batch) in results.iter() {
        assert_that(&batch.len()).is_equal_to(3);
    }

    let ranking = Ranking::summarize(&results);
    let ranked: Vec<_> = ranking.ranked().map(|x| x.name_server().to_string()).collect();
    assert_that(&ranked).is_equal_to(vec![fast.to_string(), silent.to_string()]);
    let fastest: Vec<_> = ranking.fastest().iter().map(|x| x.name_server().to_string()).collect();
    assert_that(&fastest).is_equal_to(vec![fast.to_string()]);

    let silent_summary = &ranking.summaries()[0];
    assert_that(&silent_summary.successful()).is_equal_to(0);
    assert_that(&silent_summary.attempted()).is_equal_to(3);
    assert_that(&silent_summary.mean_latency()).is_none();
    for result in silent_summary.results() {
        assert_that(&result.failure()).is_equal_to(Some(&QueryError::Timeout));
        assert_that(&result.answers().is_empty()).is_true();
    }
}
