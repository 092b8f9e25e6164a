/// True for party slots monsters can reach in melee.
pub fn is_front_line(index: usize, front_line_size: usize) -> bool {
    index < front_line_size
}

/// Characters a monster may attack: the living front line while any of it
/// stands, otherwise whoever is left.
pub fn accessible_targets(alive: &[usize], front_line_size: usize) -> Vec<usize> {
    let front: Vec<usize> =
        alive.iter().copied().filter(|&i| is_front_line(i, front_line_size)).collect();
    if front.is_empty() { alive.to_vec() } else { front }
}
