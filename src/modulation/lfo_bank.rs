use rand::prelude::*;
use rand::rngs::SmallRng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::lfo::{phase_increment, start_phase, Waveform},
    params::ParameterTable,
};

/*
LFO Bank
========

A fixed set of routes, each an independent phase accumulator with its own
destination. Route configuration and route runtime state are kept in two
parallel arrays indexed identically: configuration is written by the host,
runtime state only by the bank itself.

    configs  [ RouteConfig; ROUTE_COUNT ]   channel, parameter, shape, flags
    states   [ RouteState;  ROUTE_COUNT ]   phase, one-shot latch

Per tick, routes are visited in index order. For each route:

    skip if bank inactive, route disabled, one-shot finished,
         or parameter index not in the table
    phase += rate / tick_rate
    on wrap:  phase -= 1
              one-shot?  latch finished, emit nothing this tick
    shape = random ? fresh draw : waveform(phase), negated if inverted
    value = bipolar ? map around centre : map up from minimum

Restart (manual start/stop, transport, note restart) puts every route back
at its start phase and clears the one-shot latch.
*/

/// Number of LFO routes.
pub const ROUTE_COUNT: usize = 3;

/// Host-owned configuration for one route.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteConfig {
    /// Output channel 1..=16; 0 disables the route.
    pub midi_channel: u8,
    /// Index into the parameter table.
    pub parameter_index: usize,
    pub waveform: Waveform,
    /// Modulation amount, 0..1.
    pub depth: f64,
    pub bipolar: bool,
    pub invert: bool,
    pub one_shot: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            midi_channel: 0,
            parameter_index: 0,
            waveform: Waveform::Sine,
            depth: 1.0,
            bipolar: false,
            invert: false,
            one_shot: false,
        }
    }
}

impl RouteConfig {
    pub fn on_channel(midi_channel: u8, parameter_index: usize) -> Self {
        Self {
            midi_channel,
            parameter_index,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        (1..=16).contains(&self.midi_channel)
    }

    fn depth(&self) -> f64 {
        crate::dsp::curve::clamp_unit(self.depth)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RouteState {
    phase: f64,
    finished_one_shot: bool,
}

/// One route's output for a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteSample {
    pub route: usize,
    pub channel: u8,
    pub parameter_index: usize,
    /// Waveform value after inversion, -1..+1.
    pub shape: f64,
    /// Mapped parameter value.
    pub value: i32,
}

pub struct LfoBank {
    configs: [RouteConfig; ROUTE_COUNT],
    states: [RouteState; ROUTE_COUNT],
    active: bool,
    tick_rate_hz: f64,
    rng: SmallRng,
}

impl LfoBank {
    pub fn new(configs: [RouteConfig; ROUTE_COUNT], tick_rate_hz: f64) -> Self {
        Self::with_seed(configs, tick_rate_hz, 0x5EED_1F0)
    }

    /// Construct with a fixed seed for the Random waveform.
    pub fn with_seed(configs: [RouteConfig; ROUTE_COUNT], tick_rate_hz: f64, seed: u64) -> Self {
        let mut bank = Self {
            configs,
            states: [RouteState::default(); ROUTE_COUNT],
            active: false,
            tick_rate_hz,
            rng: SmallRng::seed_from_u64(seed),
        };
        bank.reset_routes();
        bank
    }

    /// Activate and restart every route.
    pub fn start(&mut self) {
        self.reset_routes();
        self.active = true;
        log::debug!("lfo started");
    }

    /// Deactivate; routes are reset so the next start begins cleanly.
    pub fn stop(&mut self) {
        self.reset_routes();
        self.active = false;
        log::debug!("lfo stopped");
    }

    /// Note-triggered restart: reset every route and make sure the bank runs.
    pub fn restart(&mut self) {
        self.reset_routes();
        self.active = true;
        log::debug!("lfo restarted");
    }

    /// Put every route at its start phase and clear one-shot latches.
    pub fn reset_routes(&mut self) {
        for i in 0..ROUTE_COUNT {
            self.reset_route(i);
        }
    }

    fn reset_route(&mut self, route: usize) {
        let config = self.configs[route];
        let state = &mut self.states[route];
        state.phase = start_phase(config.waveform, config.bipolar, config.invert);
        state.finished_one_shot = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self, route: usize) -> Option<&RouteConfig> {
        self.configs.get(route)
    }

    pub fn configs(&self) -> &[RouteConfig; ROUTE_COUNT] {
        &self.configs
    }

    /// Replace a route's configuration. The route's runtime state is reset.
    /// Out-of-range route indices are ignored.
    pub fn set_config(&mut self, route: usize, config: RouteConfig) {
        if route < ROUTE_COUNT {
            self.configs[route] = config;
            self.reset_route(route);
        }
    }

    pub fn phase(&self, route: usize) -> Option<f64> {
        self.states.get(route).map(|s| s.phase)
    }

    pub fn has_finished_one_shot(&self, route: usize) -> bool {
        self.states.get(route).is_some_and(|s| s.finished_one_shot)
    }

    /// Advance one route by one tick.
    pub fn tick_route(
        &mut self,
        route: usize,
        rate_hz: f64,
        params: &ParameterTable,
    ) -> Option<RouteSample> {
        if !self.active {
            return None;
        }

        let config = *self.configs.get(route)?;
        if !config.is_enabled() {
            return None;
        }
        if config.one_shot && self.states[route].finished_one_shot {
            return None;
        }
        let param = params.get(config.parameter_index)?;

        let increment = phase_increment(rate_hz, self.tick_rate_hz);
        let mut phase = self.states[route].phase + increment;

        if phase >= 1.0 {
            phase = phase.fract();
            self.states[route].phase = phase;

            if config.one_shot {
                self.states[route].finished_one_shot = true;
                return None;
            }
        } else {
            self.states[route].phase = phase;
        }

        let mut shape = match config.waveform {
            Waveform::Random => self.rng.random_range(-1.0..=1.0),
            waveform => waveform.evaluate(phase),
        };
        if config.invert {
            shape = -shape;
        }

        let value = if config.bipolar {
            param.map_bipolar(shape, config.depth())
        } else {
            param.map_unipolar(shape, config.depth())
        };

        Some(RouteSample {
            route,
            channel: config.midi_channel,
            parameter_index: config.parameter_index,
            shape,
            value,
        })
    }

    /// Advance every route in index order, handing each produced sample
    /// to `emit`.
    pub fn tick<F>(&mut self, rate_hz: f64, params: &ParameterTable, mut emit: F)
    where
        F: FnMut(RouteSample),
    {
        for route in 0..ROUTE_COUNT {
            if let Some(sample) = self.tick_route(route, rate_hz, params) {
                emit(sample);
            }
        }
    }
}
