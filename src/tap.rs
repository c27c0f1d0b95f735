//! The IEEE 1149.1 TAP state machine.
//!
//! Both tables are indexed by [`TapState`] discriminant. [`TRANSITIONS`] is the
//! authoritative description of the state machine; [`TMS_TOWARD`] is computed
//! from it at compile time, so the two can never disagree.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::{Error, Result};

/// The 16 states of a JTAG TAP controller.
///
/// The discriminants are the state ids used on the wire by `GOTO_STATE` and
/// `GET_STATE`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum TapState {
    TestLogicReset = 0,
    RunTestIdle = 1,
    SelectDrScan = 2,
    CaptureDr = 3,
    ShiftDr = 4,
    Exit1Dr = 5,
    PauseDr = 6,
    Exit2Dr = 7,
    UpdateDr = 8,
    SelectIrScan = 9,
    CaptureIr = 10,
    ShiftIr = 11,
    Exit1Ir = 12,
    PauseIr = 13,
    Exit2Ir = 14,
    UpdateIr = 15,
}

/// Successor states of one TAP state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// Next state when TCK rises with TMS low.
    pub on_tms_low: TapState,
    /// Next state when TCK rises with TMS high.
    pub on_tms_high: TapState,
}

const fn t(on_tms_low: TapState, on_tms_high: TapState) -> Transition {
    Transition {
        on_tms_low,
        on_tms_high,
    }
}

use TapState::*;

/// One-step transition table.
pub const TRANSITIONS: [Transition; TapState::COUNT] = [
    /* TestLogicReset */ t(RunTestIdle, TestLogicReset),
    /* RunTestIdle    */ t(RunTestIdle, SelectDrScan),
    /* SelectDrScan   */ t(CaptureDr, SelectIrScan),
    /* CaptureDr      */ t(ShiftDr, Exit1Dr),
    /* ShiftDr        */ t(ShiftDr, Exit1Dr),
    /* Exit1Dr        */ t(PauseDr, UpdateDr),
    /* PauseDr        */ t(PauseDr, Exit2Dr),
    /* Exit2Dr        */ t(ShiftDr, UpdateDr),
    /* UpdateDr       */ t(RunTestIdle, SelectDrScan),
    /* SelectIrScan   */ t(CaptureIr, TestLogicReset),
    /* CaptureIr      */ t(ShiftIr, Exit1Ir),
    /* ShiftIr        */ t(ShiftIr, Exit1Ir),
    /* Exit1Ir        */ t(PauseIr, UpdateIr),
    /* PauseIr        */ t(PauseIr, Exit2Ir),
    /* Exit2Ir        */ t(ShiftIr, UpdateIr),
    /* UpdateIr       */ t(RunTestIdle, SelectDrScan),
];

/// `TMS_TOWARD[from][to]` is the TMS level that moves `from` one step along
/// the shortest path to `to`.
///
/// Entries on the diagonal are `false` and never consulted.
pub const TMS_TOWARD: [[bool; TapState::COUNT]; TapState::COUNT] = tms_matrix();

impl TapState {
    /// Number of TAP states.
    pub const COUNT: usize = 16;

    /// All states, in id order.
    pub const ALL: [TapState; TapState::COUNT] = [
        TestLogicReset,
        RunTestIdle,
        SelectDrScan,
        CaptureDr,
        ShiftDr,
        Exit1Dr,
        PauseDr,
        Exit2Dr,
        UpdateDr,
        SelectIrScan,
        CaptureIr,
        ShiftIr,
        Exit1Ir,
        PauseIr,
        Exit2Ir,
        UpdateIr,
    ];

    /// The state reached after one TCK pulse with the given TMS level.
    #[inline(always)]
    pub const fn next(self, tms: bool) -> TapState {
        let transition = TRANSITIONS[self as usize];
        if tms {
            transition.on_tms_high
        } else {
            transition.on_tms_low
        }
    }

    /// The TMS level to apply in this state to get closer to `target`.
    #[inline(always)]
    pub const fn tms_toward(self, target: TapState) -> bool {
        TMS_TOWARD[self as usize][target as usize]
    }

    /// Decodes a state id as sent in a request's `wValue`.
    pub fn from_wire(id: u16) -> Result<TapState> {
        u8::try_from(id)
            .ok()
            .and_then(|id| TapState::try_from(id).ok())
            .ok_or(Error::InvalidState(id))
    }
}

/// Shortest distance, in TCK pulses, from every state to `target`.
const fn distances_to(target: usize) -> [u8; TapState::COUNT] {
    let mut distance = [u8::MAX; TapState::COUNT];
    distance[target] = 0;

    // Relaxing every edge COUNT times is enough for a 16 node graph.
    let mut round = 0;
    while round < TapState::COUNT {
        let mut state = 0;
        while state < TapState::COUNT {
            let transition = TRANSITIONS[state];
            let low = distance[transition.on_tms_low as usize];
            let high = distance[transition.on_tms_high as usize];
            let nearest = if low < high { low } else { high };
            let via = nearest.saturating_add(1);
            if via < distance[state] {
                distance[state] = via;
            }
            state += 1;
        }
        round += 1;
    }

    distance
}

const fn tms_matrix() -> [[bool; TapState::COUNT]; TapState::COUNT] {
    let mut matrix = [[false; TapState::COUNT]; TapState::COUNT];

    let mut target = 0;
    while target < TapState::COUNT {
        let distance = distances_to(target);
        let mut state = 0;
        while state < TapState::COUNT {
            if state != target {
                let transition = TRANSITIONS[state];
                let high = distance[transition.on_tms_high as usize];
                let low = distance[transition.on_tms_low as usize];
                matrix[state][target] = high < low;
            }
            state += 1;
        }
        target += 1;
    }

    matrix
}

#[cfg(test)]
mod test {
    use super::*;

    /// Per-state TMS maps as used by the Arduino-JTAG family of bit-bangers:
    /// bit `i` of entry `s` is the TMS level that moves state `s` toward `i`.
    const PACKED_TMS_MAP: [u16; 16] = [
        0x0001, 0xFFFD, 0xFE03, 0xFFE7, 0xFFEF, 0xFF0F, 0xFFBF, 0xFF0F, 0xFEFD, 0x01FF, 0xF3FF,
        0xF7FF, 0x87FF, 0xDFFF, 0x87FF, 0x7FFD,
    ];

    fn walk(from: TapState, to: TapState) -> Option<usize> {
        let mut state = from;
        for steps in 0..=TapState::COUNT {
            if state == to {
                return Some(steps);
            }
            state = state.next(state.tms_toward(to));
        }
        None
    }

    #[test]
    fn test_ids_round_trip() {
        for (id, state) in TapState::ALL.iter().enumerate() {
            assert_eq!(u8::from(*state) as usize, id);
            assert_eq!(TapState::try_from(id as u8).ok(), Some(*state));
        }
    }

    #[test]
    fn test_transitions_stay_in_range() {
        for transition in TRANSITIONS.iter() {
            assert!((transition.on_tms_low as usize) < TapState::COUNT);
            assert!((transition.on_tms_high as usize) < TapState::COUNT);
        }
    }

    #[test]
    fn test_five_tms_high_resets_from_anywhere() {
        for start in TapState::ALL {
            let mut state = start;
            for _ in 0..5 {
                state = state.next(true);
            }
            assert_eq!(state, TestLogicReset, "from {:?}", start);
        }
    }

    #[test]
    fn test_greedy_walk_converges() {
        for from in TapState::ALL {
            for to in TapState::ALL {
                if to == TestLogicReset {
                    continue;
                }
                let steps = walk(from, to);
                assert!(steps.is_some(), "{:?} -> {:?} did not converge", from, to);
                assert!(steps.unwrap() <= TapState::COUNT);
            }
        }
    }

    #[test]
    fn test_matrix_matches_packed_map() {
        for from in 0..TapState::COUNT {
            // State 0 is reached through the unconditional reset sequence, and
            // the diagonal is never consulted.
            for to in 1..TapState::COUNT {
                if from == to {
                    continue;
                }
                let packed = (PACKED_TMS_MAP[from] >> to) & 1 != 0;
                assert_eq!(
                    TMS_TOWARD[from][to], packed,
                    "mismatch for {:?} -> {:?}",
                    TapState::ALL[from], TapState::ALL[to]
                );
            }
        }
    }

    #[test]
    fn test_reset_to_shift_dr_path() {
        let mut state = TestLogicReset;
        let mut path = [TestLogicReset; 4];
        let mut tms = [false; 4];
        for i in 0..4 {
            tms[i] = state.tms_toward(ShiftDr);
            state = state.next(tms[i]);
            path[i] = state;
        }
        assert_eq!(tms, [false, true, false, false]);
        assert_eq!(path, [RunTestIdle, SelectDrScan, CaptureDr, ShiftDr]);
    }

    #[test]
    fn test_shift_exits_on_tms_high() {
        assert_eq!(ShiftDr.next(true), Exit1Dr);
        assert_eq!(ShiftIr.next(true), Exit1Ir);
        assert_eq!(ShiftDr.next(false), ShiftDr);
    }

    #[test]
    fn test_from_wire() {
        assert_eq!(TapState::from_wire(4), Ok(ShiftDr));
        assert_eq!(TapState::from_wire(15), Ok(UpdateIr));
        assert_eq!(TapState::from_wire(16), Err(Error::InvalidState(16)));
        assert_eq!(TapState::from_wire(0x100), Err(Error::InvalidState(0x100)));
    }
}
