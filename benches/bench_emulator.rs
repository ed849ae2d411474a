use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rv32_stub_emulator::{Emulator, EmulatorConfig, isa::DebugTarget};

/// Count a0 down from `n` while summing into a1, then spin on `jal zero, 0`.
fn countdown_program(n: u16) -> Vec<u8> {
    let n = n as u32 & 0x7FF;
    let program = [
        (n << 20) | (10 << 7) | 0x13,          // addi a0, zero, n
        (10 << 20) | (11 << 15) | (11 << 7) | 0x33, // add a1, a1, a0
        (0xFFF << 20) | (10 << 15) | (10 << 7) | 0x13, // addi a0, a0, -1
        0xFE05_1CE3,                            // bne a0, zero, -8
        0x0000_006F,                            // jal zero, 0
    ];
    program.iter().flat_map(|instr| instr.to_le_bytes()).collect()
}

fn bench_emulator_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("emulator_run");
    group.sample_size(50);

    for n in [100u16, 2000] {
        let image = countdown_program(n);
        let bench_name = format!("countdown_{}", n);
        group.bench_function(&bench_name, |b| {
            b.iter(|| {
                let config = EmulatorConfig::new().mem_size(0x1000);
                let mut emu = Emulator::from_binary(&image, config).unwrap();
                black_box(emu.run_until(|cpu| cpu.read_pc() == 0x10));
                black_box(emu.cpu().read_reg(11));
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_emulator_run);
criterion_main!(benches);
