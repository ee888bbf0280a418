use deutcorr_core::{normalize_phi, Event, TriggerClass};

use crate::{
    output::{HistogramId, PairCharge, Sink},
    selection::EventSelection,
};

/// Accumulate trigger-deuteron azimuthal correlations for one event.
///
/// Nothing is filled unless the event has at least one deuteron and at least one trigger of the
/// class in question. For every trigger its own $`(p_T, \phi)`$ is recorded, then every deuteron
/// other than the trigger itself is paired with it and
/// $`\Delta\phi = \phi_{d} - \phi_{\text{trig}}`$ is filled (folded) against the deuteron
/// $`p_T`$, keyed by the pair's charge combination. Returns the number of pairs filled.
///
/// The $`p_T \ge 5`$ GeV/$`c`$ pass also fills the deuteron's $`(p_T, \phi)`$ into the
/// charge-inclusive [`HistogramId::DeuteronPhiPt`] once per trigger it is paired with, on top of
/// the single-track fill. This happens whatever the trigger charge.
pub fn correlate<S: Sink + ?Sized>(
    event: &Event,
    selection: &EventSelection,
    sink: &mut S,
) -> usize {
    if selection.deuterons.is_empty() {
        return 0;
    }
    let mut n_pairs = 0;
    for class in TriggerClass::ALL {
        let triggers = selection.triggers(class);
        for &h in triggers.iter() {
            let Some(trigger) = event.track(h) else {
                continue;
            };
            let phi_h = normalize_phi(trigger.phi);
            sink.fill_2d(
                HistogramId::TriggerPhiPt { class, sign: None },
                trigger.pt,
                phi_h,
            );
            let sign_h = trigger.sign();
            if let Some(sign) = sign_h {
                sink.fill_2d(
                    HistogramId::TriggerPhiPt {
                        class,
                        sign: Some(sign),
                    },
                    trigger.pt,
                    phi_h,
                );
            }
            for &a in selection.deuterons.iter().filter(|&&a| a != h) {
                let Some(associate) = event.track(a) else {
                    continue;
                };
                let phi_a = normalize_phi(associate.phi);
                if class == TriggerClass::Low {
                    sink.fill_2d(HistogramId::DeuteronPhiPt(None), associate.pt, phi_a);
                }
                let (Some(sign_h), Some(sign_a)) = (sign_h, associate.sign()) else {
                    continue;
                };
                let dphi = normalize_phi(phi_a - phi_h);
                sink.fill_2d(
                    HistogramId::Correlation {
                        class,
                        pair: PairCharge::from_signs(sign_h, sign_a),
                    },
                    associate.pt,
                    dphi,
                );
                n_pairs += 1;
            }
        }
    }
    n_pairs
}
