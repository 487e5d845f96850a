use crate::error::Error;
use crate::registers;
use crate::registers::Register;
use crate::transport;

/// D-PHY timing valid for link frequencies up to `frequency` (MHz)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub frequency: u32,
    pub line_init_count: u32,
    pub lp_tx_time_count: u32,
    pub clk_prepare_count: u32,
    pub clk_zero_count: u32,
    pub clk_trail_count: u32,
    pub data_prepare_count: u32,
    pub data_zero_count: u32,
    pub wakeup_count: u32,
    pub clk_post_count: u32,
    pub data_trail_count: u32,
    pub fifo_delay: u32,
}

pub const BUCKETS: [Bucket; 7] = [
    Bucket {
        frequency: 125,
        line_init_count: 0x0700,
        lp_tx_time_count: 1,
        clk_prepare_count: 1,
        clk_zero_count: 0x03,
        clk_trail_count: 0,
        data_prepare_count: 1,
        data_zero_count: 0,
        wakeup_count: 0x4000,
        clk_post_count: 4,
        data_trail_count: 0,
        fifo_delay: 0x10,
    },
    Bucket {
        frequency: 250,
        line_init_count: 0x0e00,
        lp_tx_time_count: 1,
        clk_prepare_count: 1,
        clk_zero_count: 0x08,
        clk_trail_count: 1,
        data_prepare_count: 1,
        data_zero_count: 0,
        wakeup_count: 0x4800,
        clk_post_count: 5,
        data_trail_count: 0,
        fifo_delay: 0x20,
    },
    Bucket {
        frequency: 350,
        line_init_count: 0x1200,
        lp_tx_time_count: 2,
        clk_prepare_count: 2,
        clk_zero_count: 0x0b,
        clk_trail_count: 1,
        data_prepare_count: 3,
        data_zero_count: 1,
        wakeup_count: 0x4000,
        clk_post_count: 8,
        data_trail_count: 2,
        fifo_delay: 0x00,
    },
    Bucket {
        frequency: 500,
        line_init_count: 0x0d00,
        lp_tx_time_count: 1,
        clk_prepare_count: 1,
        clk_zero_count: 0x07,
        clk_trail_count: 0,
        data_prepare_count: 1,
        data_zero_count: 0,
        wakeup_count: 0x4000,
        clk_post_count: 5,
        data_trail_count: 0,
        fifo_delay: 0x40,
    },
    Bucket {
        frequency: 600,
        line_init_count: 0x1e00,
        lp_tx_time_count: 3,
        clk_prepare_count: 2,
        clk_zero_count: 0x14,
        clk_trail_count: 0,
        data_prepare_count: 3,
        data_zero_count: 0,
        wakeup_count: 0x4a00,
        clk_post_count: 8,
        data_trail_count: 2,
        fifo_delay: 0x00,
    },
    Bucket {
        frequency: 800,
        line_init_count: 0x2800,
        lp_tx_time_count: 4,
        clk_prepare_count: 3,
        clk_zero_count: 0x1a,
        clk_trail_count: 2,
        data_prepare_count: 4,
        data_zero_count: 0x08,
        wakeup_count: 0x4e00,
        clk_post_count: 10,
        data_trail_count: 3,
        fifo_delay: 0x00,
    },
    Bucket {
        frequency: 1000,
        line_init_count: 0x3200,
        lp_tx_time_count: 5,
        clk_prepare_count: 4,
        clk_zero_count: 0x21,
        clk_trail_count: 3,
        data_prepare_count: 5,
        data_zero_count: 0x0a,
        wakeup_count: 0x5200,
        clk_post_count: 12,
        data_trail_count: 4,
        fifo_delay: 0x00,
    },
];

const _: () = {
    let mut index = 1;
    while index < BUCKETS.len() {
        assert!(BUCKETS[index - 1].frequency < BUCKETS[index].frequency);
        index += 1;
    }
};

pub const REFERENCE_CLOCK: u32 = 27;

// 27 MHz / 9 gives a 3 MHz feedback step
pub const REFERENCE_DIVIDER: u32 = 9;

pub const LOOP_BANDWIDTH: u32 = 2;

pub const MAXIMUM_FREQUENCY: u32 = 1000;

pub const INTERRUPT_MASK: u32 = 0x05ff;

pub const PLL_SETTLE_MS: u32 = 1;

pub fn select_bucket(frequency: u32) -> &'static Bucket {
    BUCKETS
        .iter()
        .find(|bucket| bucket.frequency >= frequency)
        .unwrap_or(&BUCKETS[BUCKETS.len() - 1])
}

pub fn frequency_range(frequency: u32) -> u32 {
    if frequency < 125 {
        3
    } else if frequency < 250 {
        2
    } else if frequency < 500 {
        1
    } else {
        0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pll {
    pub prd: u32,
    pub fbd: u32,
    pub frs: u32,
    pub lbws: u32,
}

impl Pll {
    pub fn from_frequency(frequency: u32) -> Self {
        Self {
            prd: REFERENCE_DIVIDER,
            fbd: frequency.div_ceil(REFERENCE_CLOCK / REFERENCE_DIVIDER),
            frs: frequency_range(frequency),
            lbws: LOOP_BANDWIDTH,
        }
    }

    pub fn output_frequency(&self) -> u32 {
        REFERENCE_CLOCK * self.fbd / self.prd
    }

    pub fn control0(&self) -> registers::PllCtl0 {
        registers::PllCtl0 {
            fbd: self.fbd - 1,
            reserved_9_12: 0,
            prd: self.prd - 1,
        }
    }

    pub fn control1(&self, clock_enable: bool) -> registers::PllCtl1 {
        registers::PllCtl1 {
            pll_en: 1,
            resetb: 1,
            reserved_2_4: 0,
            cken: clock_enable as u32,
            bypcken: 0,
            lfbren: 0,
            reserved_7_8: 0,
            lbws: self.lbws,
            frs: self.frs,
            reserved_12_16: 0,
        }
    }
}

pub fn select_and_apply<Transport, Delay>(
    registers: &mut registers::Registers<Transport>,
    delay: &mut Delay,
    frequency: u32,
) -> Result<&'static Bucket, Error>
where
    Transport: transport::Transport,
    Delay: embedded_hal::blocking::delay::DelayMs<u32>,
{
    if frequency == 0 || frequency > MAXIMUM_FREQUENCY {
        return Err(Error::UnsupportedFrequency(frequency));
    }
    let bucket = select_bucket(frequency);
    let pll = Pll::from_frequency(frequency);
    log::debug!(
        "link {} MHz: bucket {} MHz, PLL {} MHz (fbd {}, frs {})",
        frequency,
        bucket.frequency,
        pll.output_frequency(),
        pll.fbd,
        pll.frs
    );
    registers::FifoCtl {
        level: bucket.fifo_delay,
    }
    .write(registers)?;
    registers::IntStatus { value: 0 }.write(registers)?;
    registers::IntMask {
        value: INTERRUPT_MASK,
    }
    .write(registers)?;
    pll.control0().write(registers)?;
    pll.control1(false).write(registers)?;
    delay.delay_ms(PLL_SETTLE_MS);
    pll.control1(true).write(registers)?;
    registers::LineInitCnt {
        value: bucket.line_init_count,
    }
    .write(registers)?;
    registers::LpTxTimeCnt {
        value: bucket.lp_tx_time_count,
    }
    .write(registers)?;
    registers::TclkHeaderCnt {
        prepare: bucket.clk_prepare_count,
        reserved_7_8: 0,
        zero: bucket.clk_zero_count,
    }
    .write(registers)?;
    registers::TclkTrailCnt {
        value: bucket.clk_trail_count,
    }
    .write(registers)?;
    registers::ThsHeaderCnt {
        prepare: bucket.data_prepare_count,
        reserved_7_8: 0,
        zero: bucket.data_zero_count,
    }
    .write(registers)?;
    registers::Twakeup {
        value: bucket.wakeup_count,
    }
    .write(registers)?;
    registers::TclkPostCnt {
        value: bucket.clk_post_count,
    }
    .write(registers)?;
    registers::ThsTrailCnt {
        value: bucket.data_trail_count,
    }
    .write(registers)?;
    Ok(bucket)
}
