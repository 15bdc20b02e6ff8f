use bencher::{TestCase, TestFile};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use http_engine::codec::MessageDecoder;
use std::hint::black_box;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

static SMALL_HEADER: TestFile = TestFile::new("get_small.txt", include_str!("../resources/request/get_small.txt"));
static LARGE_HEADER: TestFile = TestFile::new("get_large.txt", include_str!("../resources/request/get_large.txt"));
static CHUNKED_RESPONSE: TestFile = TestFile::new("chunked.txt", include_str!("../resources/response/chunked.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::whole("small_header", SMALL_HEADER),
        TestCase::whole("large_header", LARGE_HEADER),
        TestCase::fragmented("large_header_16b_reads", LARGE_HEADER, 16),
        TestCase::whole("chunked_response", CHUNKED_RESPONSE),
        TestCase::fragmented("chunked_response_64b_reads", CHUNKED_RESPONSE, 64),
    ]
}

/// Feeds every fragment of the case and counts the decoded events.
fn decode_case(case: &TestCase) -> usize {
    let mut decoder = MessageDecoder::new();
    let mut buffer = BytesMut::new();
    let mut events = 0;

    for fragment in case.fragments() {
        buffer.extend_from_slice(fragment);
        while let Some(message) = decoder.decode(&mut buffer).expect("fixture should be a valid http message") {
            black_box(message);
            events += 1;
        }
    }

    events
}

fn benchmark_message_decoder(criterion: &mut Criterion) {
    let test_cases = create_test_cases();
    let mut group = criterion.benchmark_group("message_decoder");

    for case in test_cases {
        group.throughput(Throughput::Bytes(case.file().content().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(|| *case, |case| black_box(decode_case(&case)), BatchSize::SmallInput);
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_message_decoder);
criterion_main!(decoder);
