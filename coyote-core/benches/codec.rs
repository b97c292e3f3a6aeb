use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coyote_core::{Ack, Sequence, StrengthChange, StrengthCommand, Waveform};

fn bench_encode(c: &mut Criterion) {
    let wave = Waveform::from_raw([10, 20, 30, 40], [20, 40, 60, 80]);
    let command = StrengthCommand {
        sequence: Sequence::wrapping(7),
        a: StrengthChange::absolute(36),
        b: StrengthChange::absolute(36),
        a_waveform: wave,
        b_waveform: wave,
    };

    c.bench_function("strength_command_encode", |b| {
        b.iter(|| black_box(&command).encode())
    });
}

fn bench_ack_decode(c: &mut Criterion) {
    let frame = [0xB1, 0x70, 36, 36];

    c.bench_function("ack_decode", |b| b.iter(|| Ack::decode(black_box(&frame))));
}

criterion_group!(benches, bench_encode, bench_ack_decode);
criterion_main!(benches);
