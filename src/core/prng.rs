// Minimal PRNG for firing-threshold noise.
//
// This is NOT cryptographically secure. The kernel only needs cheap,
// reproducible jitter.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    /// Independent stream for one neuron at one tick.
    ///
    /// The draw depends only on `(seed, tick, neuron)`, so it is the same
    /// whichever thread evaluates the neuron.
    #[inline]
    pub fn for_neuron(seed: u64, tick: i64, neuron: u32) -> Self {
        let mut h = splitmix64(seed ^ (tick as u64).wrapping_mul(0xD1B54A32D192ED03));
        h = splitmix64(h ^ neuron as u64);
        Self::new(h)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform integer in `[-amplitude, amplitude]`. Zero when `amplitude <= 0`.
    #[inline]
    pub fn gen_symmetric_i32(&mut self, amplitude: i32) -> i32 {
        if amplitude <= 0 {
            return 0;
        }
        let span = 2 * amplitude as u32 + 1;
        (self.next_u32() % span) as i32 - amplitude
    }

    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u32;
        let v = self.next_u32() % span;
        low + v as usize
    }
}

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E3779B97F4A7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}
