use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use http::StatusCode;
use httpfromtcp::codec::{parse_from_stream, ChunkedEncoder, Head, HeaderEncoder, RequestDecoder};
use httpfromtcp::connection::ResponseWriter;
use httpfromtcp::protocol::{Headers, PayloadItem};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

const GET_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

const POST_REQUEST: &[u8] =
    b"POST /submit HTTP/1.1\r\nHost: localhost\r\nContent-Type: text/plain\r\nContent-Length: 13\r\n\r\nhello world!\n";

fn bench_request_decoder(c: &mut Criterion) {
    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(GET_REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });

    c.bench_function("decode_request_with_body", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(POST_REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });

    c.bench_function("decode_request_byte_by_byte", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::new();
            let mut request = None;
            for byte in POST_REQUEST {
                bytes.extend_from_slice(&[*byte]);
                request = decoder.decode(&mut bytes).unwrap();
            }
            black_box(request.unwrap());
        });
    });
}

fn bench_parse_from_stream(c: &mut Criterion) {
    c.bench_function("parse_from_stream", |b| {
        b.iter(|| black_box(block_on(parse_from_stream(POST_REQUEST)).unwrap()));
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let headers = Headers::default_response(12);

    c.bench_function("encode_simple_response_head", |b| {
        b.iter(|| {
            let mut bytes = BytesMut::new();
            HeaderEncoder.encode(Head::StatusLine(StatusCode::OK), &mut bytes).unwrap();
            HeaderEncoder.encode(Head::Fields(&headers), &mut bytes).unwrap();
            black_box(bytes);
        });
    });

    let chunk = [b'x'; 1024];
    c.bench_function("encode_chunked_body", |b| {
        b.iter(|| {
            let mut encoder = ChunkedEncoder::new();
            let mut bytes = BytesMut::new();
            for _ in 0..16 {
                encoder.encode(PayloadItem::Chunk(&chunk[..]), &mut bytes).unwrap();
            }
            encoder.encode(PayloadItem::<&[u8]>::Eof, &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_response_writer(c: &mut Criterion) {
    let headers = Headers::default_response(12);

    c.bench_function("write_simple_response", |b| {
        b.iter(|| {
            let mut writer = ResponseWriter::new(Vec::with_capacity(256));
            block_on(async {
                writer.write_status_line(StatusCode::OK).await.unwrap();
                writer.write_headers(&headers).await.unwrap();
                writer.write_body(b"Hello World!").await.unwrap();
            });
            black_box(writer.into_inner());
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_parse_from_stream, bench_response_encoder, bench_response_writer);
criterion_main!(benches);
