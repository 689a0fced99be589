use rand::Rng;
use rand::rngs::StdRng;

use super::engine::Slot;

/// Place each slot at a uniformly drawn index, probing forward (wrapping)
/// to the first empty position on collision.
///
/// The result is always a valid permutation, but earlier-placed slots are
/// more likely to land near their drawn index, so the distribution over
/// permutations is not uniform.
pub(super) fn permute_slots(slots: Vec<Slot>, rng: &mut StdRng) -> Vec<Slot> {
    let len = slots.len();
    if len <= 1 {
        return slots;
    }
    let mut placed: Vec<Option<Slot>> = Vec::with_capacity(len);
    placed.resize_with(len, || None);

    for slot in slots {
        let mut index = rng.gen_range(0..len);
        loop {
            match placed.get_mut(index) {
                Some(position) if position.is_none() => {
                    *position = Some(slot);
                    break;
                }
                Some(_) => {
                    index = index.saturating_add(1).checked_rem(len).unwrap_or(0);
                }
                None => index = 0,
            }
        }
    }

    placed.into_iter().flatten().collect()
}
