mod common;

use hdmi_bridge_drivers::error::Error;
use hdmi_bridge_drivers::registers;
use hdmi_bridge_drivers::registers::Register;

#[test]
fn every_covered_address_has_one_width() {
    for range in registers::WIDTHS.iter() {
        for address in range.start..=range.end {
            let matching = registers::WIDTHS
                .iter()
                .filter(|candidate| candidate.start <= address && address <= candidate.end)
                .count();
            assert_eq!(matching, 1, "{address:#06x}");
            let width = registers::resolve_width(address).unwrap();
            assert!([1, 2, 4].contains(&width));
        }
    }
}

#[test]
fn uncovered_addresses_are_unknown() {
    for address in [0x005b, 0x0100, 0x0151, 0x0203, 0x0239, 0x06cd, 0x7101, 0x84ff, 0x9300, 0xffff]
    {
        assert_eq!(
            registers::resolve_width(address),
            Err(Error::UnknownRegister(address))
        );
    }
    assert_eq!(registers::resolve_width(0x0000), Ok(2));
    assert_eq!(registers::resolve_width(0x0238), Ok(4));
    assert_eq!(registers::resolve_width(0x8544), Ok(1));
}

#[test]
fn write_serializes_address_high_first_and_value_low_first() {
    let bus = common::Bus::new();
    let mut registers = common::registers(&bus);
    registers.write(0x0500, 0xa30080a6).unwrap();
    registers.write(0x0004, 0x0cf7).unwrap();
    registers.write(0x8544, 0x10).unwrap();
    let chip = bus.chip.borrow();
    assert_eq!(
        chip.writes,
        vec![
            (0x0f, vec![0x05, 0x00, 0xa6, 0x80, 0x00, 0xa3]),
            (0x0f, vec![0x00, 0x04, 0xf7, 0x0c]),
            (0x0f, vec![0x85, 0x44, 0x10]),
        ]
    );
}

#[test]
fn read_assembles_little_endian() {
    let bus = common::Bus::new();
    bus.chip
        .borrow_mut()
        .set(0x0204, &[0x78, 0x56, 0x34, 0x12]);
    let mut registers = common::registers(&bus);
    assert_eq!(registers.read(0x0204).unwrap(), 0x12345678);
    assert_eq!(registers.read(0x0000).unwrap(), 0x4700);
    assert_eq!(bus.chip.borrow().reads, vec![(0x0f, 0x0204, 4), (0x0f, 0x0000, 2)]);
}

#[test]
fn overflowing_values_are_rejected_before_the_bus() {
    let bus = common::Bus::new();
    let mut registers = common::registers(&bus);
    assert_eq!(
        registers.write(0x8540, 0x0a8c),
        Err(Error::ValueOverflow {
            address: 0x8540,
            value: 0x0a8c,
            width: 1
        })
    );
    assert_eq!(
        registers.write(0x0020, 0x1_0000),
        Err(Error::ValueOverflow {
            address: 0x0020,
            value: 0x1_0000,
            width: 2
        })
    );
    assert_eq!(
        registers.write(0x4000, 0),
        Err(Error::UnknownRegister(0x4000))
    );
    assert!(bus.chip.borrow().writes.is_empty());
}

#[test]
fn transport_failures_carry_the_address() {
    let bus = common::Bus::new();
    bus.chip.borrow_mut().fail_at = Some(1);
    let mut registers = common::registers(&bus);
    match registers.write(0x0002, 0x0f00) {
        Err(Error::Transport { address, .. }) => assert_eq!(address, 0x0002),
        result => panic!("unexpected {result:?}"),
    }
}

#[test]
fn bursts_stay_in_one_transfer_and_range() {
    let bus = common::Bus::new();
    let mut registers = common::registers(&bus);
    registers.write_burst(0x8c00, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    assert_eq!(
        registers.write_burst(0x8c00, &[0; 9]),
        Err(Error::BurstTooLong {
            address: 0x8c00,
            length: 9
        })
    );
    assert_eq!(
        registers.write_burst(0x8ffc, &[0; 8]),
        Err(Error::BurstTooLong {
            address: 0x8ffc,
            length: 8
        })
    );
    let chip = bus.chip.borrow();
    assert_eq!(chip.writes.len(), 1);
    assert_eq!(chip.get(0x8c07), 8);
}

#[test]
fn bit_fields_pack_and_unpack() {
    let control0 = registers::PllCtl0 {
        fbd: 199,
        reserved_9_12: 0,
        prd: 8,
    };
    assert_eq!(control0.value(), 0x80c7);
    assert_eq!(registers::PllCtl0::from_value(0x80c7), control0);
    let header = registers::TclkHeaderCnt {
        prepare: 2,
        reserved_7_8: 0,
        zero: 0x14,
    };
    assert_eq!(header.value(), 0x1402);
    assert_eq!(registers::ChipId::from_value(0x4700).chip, 0x47);
    assert_eq!(registers::SysStatus::from_value(0x80).sync, 1);
}
