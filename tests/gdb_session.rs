mod common;

use std::sync::atomic::{AtomicBool, Ordering};

use common::*;
use rv32_stub_emulator::{
    Emulator, EmulatorConfig,
    cpu::abi::*,
    debugger::{SimulatedClient, simulated_pair},
    isa::DebugTarget,
};

const MEM_SIZE: usize = 0x1000;

fn request(client: &SimulatedClient, packet: &str) -> String {
    client.send_packet(packet);
    client.recv_packet().expect("stub hung up")
}

fn reg_hex(regs: &str, idx: u8) -> &str {
    &regs[idx as usize * 8..][..8]
}

#[test]
fn patch_and_continue_to_breakpoint() {
    let image = assemble(&[addi(A0, ZERO, 7), NOP, NOP]);
    let mut emu =
        Emulator::from_binary(&image, EmulatorConfig::new().mem_size(MEM_SIZE)).unwrap();
    let (channel, client) = simulated_pair();
    emu.attach_debugger(channel);

    let done = AtomicBool::new(false);
    crossbeam::scope(|s| {
        s.spawn(|_| emu.run_until(|_| done.load(Ordering::Acquire)));

        // Break on attach: nothing has run yet.
        let stop = client.recv_packet().unwrap();
        assert_eq!(stop, "T0508:00100000;02:00100000;20:00000000;");

        let regs = request(&client, "g");
        assert_eq!(regs.len(), 264);
        assert_eq!(reg_hex(&regs, A0), "0c000000");
        assert_eq!(reg_hex(&regs, SP), "00100000");

        let patch = to_hex(&[addi(A0, A0, 35), EBREAK]);
        assert_eq!(request(&client, &format!("M4,8:{}", patch)), "OK");
        assert_eq!(request(&client, "m4,8"), patch);
        assert_eq!(request(&client, "m1000,9"), "E03");
        assert_eq!(request(&client, "?"), "S05");

        client.send_packet("c");

        // The ebreak at 8 traps; the report carries mepc.
        let stop = client.recv_packet().unwrap();
        assert_eq!(stop, "T0508:00100000;02:00100000;20:08000000;");
        let regs = request(&client, "g");
        assert_eq!(reg_hex(&regs, A0), "2a000000");
        assert_eq!(reg_hex(&regs, PC), "00000000");
        assert_eq!(request(&client, "m0,4"), to_hex(&[addi(A0, ZERO, 7)]));

        done.store(true, Ordering::Release);
        client.disconnect();
    })
    .unwrap();

    assert!(!emu.has_debugger());
    assert_eq!(emu.cpu().read_mem::<u32>(8).unwrap(), EBREAK);
}

#[test]
fn interrupt_running_guest() {
    // An endless loop: `jal zero, 0`.
    let image = assemble(&[0x0000_006f]);
    let config = EmulatorConfig::new()
        .mem_size(MEM_SIZE)
        .break_on_attach(false);
    let mut emu = Emulator::from_binary(&image, config).unwrap();
    let (channel, client) = simulated_pair();
    emu.attach_debugger(channel);

    let done = AtomicBool::new(false);
    crossbeam::scope(|s| {
        s.spawn(|_| emu.run_until(|_| done.load(Ordering::Acquire)));

        client.send_input_data([0x03]);
        let stop = client.recv_packet().unwrap();
        assert!(stop.ends_with("20:00000000;"), "{}", stop);
        assert_eq!(request(&client, "qSupported"), "PacketSize=1024");

        done.store(true, Ordering::Release);
        client.send_packet("c");
    })
    .unwrap();

    assert!(emu.has_debugger());
}

#[test]
fn corrupted_packet_is_retransmitted() {
    let image = assemble(&[NOP]);
    let mut emu =
        Emulator::from_binary(&image, EmulatorConfig::new().mem_size(MEM_SIZE)).unwrap();
    let (channel, client) = simulated_pair();
    emu.attach_debugger(channel);

    let done = AtomicBool::new(false);
    crossbeam::scope(|s| {
        s.spawn(|_| emu.run_until(|_| done.load(Ordering::Acquire)));

        assert!(client.recv_packet().unwrap().starts_with("T05"));

        client.send_input_data(*b"$m0,4#00");
        let mut nack = client.recv_byte();
        while nack == Some(b'+') {
            nack = client.recv_byte();
        }
        assert_eq!(nack, Some(b'-'));

        client.send_input_data(*b"$M0,4:deadbeef#00");
        assert_eq!(client.recv_byte(), Some(b'-'));

        assert_eq!(request(&client, "m0,4"), "13000000");

        done.store(true, Ordering::Release);
        client.send_packet("c");
    })
    .unwrap();
}
