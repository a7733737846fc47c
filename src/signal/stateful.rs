//! Stateful operator semantics. Each operator reads/writes a state slab
//! starting at its `state_offset` in the evaluator's [`crate::state_buffer::StateBuffer`].

use crate::consts::*;
use crate::context::RuntimeContext;
use crate::error::EvalError;
use crate::state_buffer::StateBuffer;

/// `integrate`: `acc += input · deltaSec`; `f64[0]` = accumulator.
pub fn integrate(state: &mut StateBuffer, offset: usize, input: f64, ctx: &RuntimeContext) -> f64 {
    let acc = state.f64_at(offset, 0) + input * ctx.delta_sec;
    state.set_f64_at(offset, 0, acc);
    acc
}

/// `sampleHold`: `f64[0]` = held, `f64[1]` = last trigger.
pub fn sample_hold(state: &mut StateBuffer, offset: usize, input: f64, trigger: f64) -> f64 {
    let last_trigger = state.f64_at(offset, 1);
    let mut held = state.f64_at(offset, 0);
    if trigger > EDGE_RISING_THRESHOLD && last_trigger <= EDGE_RISING_THRESHOLD {
        held = input;
    }
    state.set_f64_at(offset, 0, held);
    state.set_f64_at(offset, 1, trigger);
    held
}

/// `slew`: `α = 1 − exp(−rate·deltaSec)`; `current += (target−current)·α`.
pub fn slew(state: &mut StateBuffer, offset: usize, target: f64, rate: Option<f64>, ctx: &RuntimeContext) -> f64 {
    let rate = rate.unwrap_or(DEFAULT_SLEW_RATE);
    let current = state.f64_at(offset, 0);
    let next = crate::transform::slew_step(current, target, rate, ctx.delta_sec);
    state.set_f64_at(offset, 0, next);
    next
}

/// `delayMs`: `i32[0]` = write index, `f64[1..bufferSize]` = ring buffer.
pub fn delay_ms(
    state: &mut StateBuffer,
    offset: usize,
    input: f64,
    delay_ms: Option<f64>,
    buffer_size: Option<usize>,
    ctx: &RuntimeContext,
) -> f64 {
    let delay_ms = delay_ms.unwrap_or(DEFAULT_DELAY_MS);
    let buffer_size = buffer_size.unwrap_or(DEFAULT_DELAY_BUFFER_SIZE).max(1);

    let write = state.i32_at(offset, 0) as usize % buffer_size;
    let delta_ms = ctx.delta_ms();
    let read_offset = if delta_ms > 0.0 {
        ((delay_ms / delta_ms).floor() as usize).min(buffer_size - 1)
    } else {
        buffer_size - 1
    };
    let read_index = (write + buffer_size - read_offset) % buffer_size;
    // state.f64 slab layout is [0]=unused placeholder for i32 slab alignment,
    // actual ring buffer occupies f64 cells [1 ..= bufferSize].
    let out = state.f64_at(offset, 1 + read_index);
    state.set_f64_at(offset, 1 + write, input);
    state.set_i32_at(offset, 0, ((write + 1) % buffer_size) as i32);
    out
}

/// `delayFrames`: `i32[0]` = write index, `f64[1..=delayFrames]` = ring
/// buffer; reads the oldest sample.
pub fn delay_frames(state: &mut StateBuffer, offset: usize, input: f64, delay_frames: Option<usize>) -> f64 {
    let delay_frames = delay_frames.unwrap_or(DEFAULT_DELAY_FRAMES);
    let buffer_size = delay_frames + 1;
    let write = state.i32_at(offset, 0) as usize % buffer_size;
    let read_index = (write + 1) % buffer_size;
    let out = state.f64_at(offset, 1 + read_index);
    state.set_f64_at(offset, 1 + write, input);
    state.set_i32_at(offset, 0, ((write + 1) % buffer_size) as i32);
    out
}

/// `edgeDetectWrap`: `f64[0]` = previous phase.
pub fn edge_detect_wrap(state: &mut StateBuffer, offset: usize, ctx: &RuntimeContext) -> f64 {
    let phase = ctx.phase();
    let prev = state.f64_at(offset, 0);
    let wrapped = prev > EDGE_WRAP_HIGH && phase < EDGE_WRAP_LOW;
    state.set_f64_at(offset, 0, phase);
    if wrapped {
        1.0
    } else {
        0.0
    }
}

/// `pulseDivider`: `f64[0]` = last subphase.
pub fn pulse_divider(state: &mut StateBuffer, offset: usize, divisions: Option<f64>, ctx: &RuntimeContext) -> f64 {
    let divisions = divisions.unwrap_or(DEFAULT_PULSE_DIVISIONS);
    let phase = ctx.phase();
    let sub = (phase * divisions).floor();
    let last = state.f64_at(offset, 0);
    state.set_f64_at(offset, 0, sub);
    if sub != last {
        1.0
    } else {
        0.0
    }
}

/// `envelopeAD`: `f64[0]` = trigger time, `f64[1]` = was-triggered flag.
pub fn envelope_ad(
    state: &mut StateBuffer,
    offset: usize,
    trigger: f64,
    attack_ms: Option<f64>,
    decay_ms: Option<f64>,
    peak: Option<f64>,
    ctx: &RuntimeContext,
) -> f64 {
    let attack_ms = attack_ms.unwrap_or(DEFAULT_ENVELOPE_ATTACK_MS);
    let decay_ms = decay_ms.unwrap_or(DEFAULT_ENVELOPE_DECAY_MS);
    let peak = peak.unwrap_or(DEFAULT_ENVELOPE_PEAK);

    let was_triggered = state.f64_at(offset, 1) > EDGE_RISING_THRESHOLD;
    let rising_edge = trigger > EDGE_RISING_THRESHOLD && !was_triggered;

    if rising_edge {
        state.set_f64_at(offset, 0, ctx.t_abs_ms);
    }
    state.set_f64_at(offset, 1, trigger);

    let trigger_time = state.f64_at(offset, 0);
    let elapsed = ctx.t_abs_ms - trigger_time;

    if elapsed < 0.0 {
        0.0
    } else if elapsed < attack_ms {
        if attack_ms == 0.0 {
            peak
        } else {
            peak * (elapsed / attack_ms)
        }
    } else if elapsed < attack_ms + decay_ms {
        let decay_elapsed = elapsed - attack_ms;
        if decay_ms == 0.0 {
            0.0
        } else {
            peak * (1.0 - decay_elapsed / decay_ms)
        }
    } else {
        0.0
    }
}

/// Validate a `sampleHold` node carries a trigger reference.
pub fn require_trigger<T>(trigger: Option<T>) -> Result<T, EvalError> {
    trigger.ok_or(EvalError::MissingTriggerParam)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(delta_sec: f64) -> RuntimeContext {
        RuntimeContext {
            t_abs_ms: 0.0,
            t_model_ms: None,
            phase01: None,
            wrap_occurred: false,
            delta_sec,
            frame_index: 0,
        }
    }

    #[test]
    fn integrate_accumulates() {
        let mut state = StateBuffer::new(1, 0, 0);
        let c = ctx(0.1);
        let mut acc = 0.0;
        for _ in 0..10 {
            acc = integrate(&mut state, 0, 1.0, &c);
        }
        assert!((acc - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sample_hold_latches_on_rising_edge() {
        let mut state = StateBuffer::new(2, 0, 0);
        assert_eq!(sample_hold(&mut state, 0, 5.0, 0.0), 0.0);
        assert_eq!(sample_hold(&mut state, 0, 5.0, 1.0), 5.0);
        assert_eq!(sample_hold(&mut state, 0, 9.0, 1.0), 5.0, "no re-latch while held high");
    }

    #[test]
    fn delay_frames_reads_oldest() {
        // delayFrames=1 => a 2-slot ring buffer; each call reads the sample
        // written one call ago, i.e. output trails input by exactly one call.
        let mut state = StateBuffer::new(3, 0, 1);
        assert_eq!(delay_frames(&mut state, 0, 1.0, Some(1)), 0.0);
        assert_eq!(delay_frames(&mut state, 0, 2.0, Some(1)), 1.0);
        assert_eq!(delay_frames(&mut state, 0, 3.0, Some(1)), 2.0);
    }

    #[test]
    fn pulse_divider_fires_on_sub_change() {
        let mut c = ctx(0.0);
        let mut state = StateBuffer::new(1, 0, 0);
        c.phase01 = Some(0.0);
        assert_eq!(pulse_divider(&mut state, 0, Some(4.0), &c), 1.0);
        c.phase01 = Some(0.1);
        assert_eq!(pulse_divider(&mut state, 0, Some(4.0), &c), 0.0);
        c.phase01 = Some(0.3);
        assert_eq!(pulse_divider(&mut state, 0, Some(4.0), &c), 1.0);
    }
}
