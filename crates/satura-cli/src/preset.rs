//! TOML preset files naming the full control state.

use satura_effects::Parameters;
use serde::Deserialize;

/// One preset: every control value, all optional with the processor's
/// defaults.
///
/// ```toml
/// name = "crunch"
/// input_gain_db = 6.0
/// distortion_gain_db = 18.0
/// lowpass_hz = 8000.0
/// oversampler_index = 4
/// mix_percent = 85.0
/// ```
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Preset {
    pub name: String,
    pub input_gain_db: f32,
    pub output_gain_db: f32,
    pub mix_percent: f32,
    pub distortion_enabled: bool,
    pub waveshaper_index: usize,
    pub oversampler_index: usize,
    pub highpass_hz: f32,
    pub lowpass_hz: f32,
    pub distortion_gain_db: f32,
    pub compensation_gain_db: f32,
    pub distortion_mix_percent: f32,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            mix_percent: 100.0,
            distortion_enabled: true,
            waveshaper_index: 0,
            oversampler_index: 0,
            highpass_hz: 20.0,
            lowpass_hz: 22000.0,
            distortion_gain_db: 0.0,
            compensation_gain_db: 0.0,
            distortion_mix_percent: 100.0,
        }
    }
}

impl Preset {
    /// Push every value into the shared parameter store.
    pub fn apply(&self, params: &Parameters) {
        params.set_input_gain_db(self.input_gain_db);
        params.set_output_gain_db(self.output_gain_db);
        params.set_mix_percent(self.mix_percent);
        params.set_distortion_enabled(self.distortion_enabled);
        params.set_waveshaper_index(self.waveshaper_index);
        params.set_oversampler_index(self.oversampler_index);
        params.set_highpass_hz(self.highpass_hz);
        params.set_lowpass_hz(self.lowpass_hz);
        params.set_distortion_gain_db(self.distortion_gain_db);
        params.set_compensation_gain_db(self.compensation_gain_db);
        params.set_distortion_mix_percent(self.distortion_mix_percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_preset_keeps_defaults() {
        let preset: Preset = toml::from_str(
            r#"
            name = "crunch"
            distortion_gain_db = 18.0
            lowpass_hz = 8000.0
            "#,
        )
        .unwrap();
        assert_eq!(preset.name, "crunch");
        assert_eq!(preset.distortion_gain_db, 18.0);
        assert_eq!(preset.lowpass_hz, 8000.0);
        assert_eq!(preset.mix_percent, 100.0);
        assert!(preset.distortion_enabled);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Preset, _> = toml::from_str("unknown_knob = 1.0");
        assert!(result.is_err());
    }

    #[test]
    fn apply_lands_in_the_store() {
        let preset: Preset = toml::from_str(
            r#"
            oversampler_index = 5
            mix_percent = 40.0
            "#,
        )
        .unwrap();
        let params = Parameters::new();
        preset.apply(&params);
        let snap = params.snapshot();
        assert_eq!(snap.oversampler_index, 5);
        assert_eq!(snap.mix_percent, 40.0);
    }
}
