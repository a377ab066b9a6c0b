//! Pure stabilizer states of a finite register of qubits.
//!
//! States are stored in the Aaronson–Gottesman tableau form: `2n + 1` rows
//! of `n`-qubit Pauli operators, where rows `0..n` are destabilizers, rows
//! `n..2n` are stabilizers, and row `2n` is scratch space. Each gate is applied
//! as a conjugation of every row, and measurements are performed by row
//! reduction, so that an `n`-qubit state costs *O*(*n*<sup>2</sup>) bits
//! instead of 2<sup>*n*</sup> amplitudes.
//!
//! See also: [arXiv:quant-ph/0406196](https://arxiv.org/abs/quant-ph/0406196)

use std::fmt;
use nalgebra as na;
use ndarray::{ self as nd, s };
use num_complex::Complex64 as C64;
use rand::Rng;
use crate::{
    clifford::Clifford,
    error::{ ShadowError, ShadowResult },
    gate::{ Gate, Pauli, Phase },
    recon::MAX_DENSE_QUBITS,
};

const PW: [u32; 32] = [ // PW[i] = 2^i
    1, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768,
    65536, 131072, 262144, 524288, 1048576, 2097152, 4194304, 8388608, 16777216,
    33554432, 67108864, 134217728, 268435456, 536870912, 1073741824, 2147483648
];

/// The result of a single-qubit Z-basis measurement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A deterministic outcome resulting in ∣0⟩
    Det0,
    /// A deterministic outcome resulting in ∣1⟩
    Det1,
    /// A random outcome resulting in ∣0⟩
    Rand0,
    /// A random outcome resulting in ∣1⟩
    Rand1,
}

impl Outcome {
    /// Return `true` if the qubit was left in ∣1⟩.
    pub fn is_one(self) -> bool { matches!(self, Self::Det1 | Self::Rand1) }

    /// Return the outcome as a bare bit.
    pub fn as_bit(self) -> u8 { u8::from(self.is_one()) }
}

/// A stabilizer state of a finite register of qubits, identified by its
/// stabilizer group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stab {
    pub(crate) n: usize,
    // `x` and `z` are bit arrays of size (2n + 1) × n; for space efficiency,
    // the columns are packed into u32s
    pub(crate) x: nd::Array2<u32>, // Pauli-X bits; size (2n + 1) × (floor(n / 32) + 1)
    pub(crate) z: nd::Array2<u32>, // Pauli-Z bits; size (2n + 1) × (floor(n / 32) + 1)
    pub(crate) r: nd::Array1<u8>, // Phases (0 for +1, 1 for i, 2 for -1, 3 for -i); size 2n + 1
    pub(crate) over32: usize, // = floor(n / 32) + 1
}

impl Stab {
    /// Create a new stabilizer state of size `n` initialized to ∣0...0⟩.
    pub fn new(n: usize) -> Self {
        let over32: usize = (n >> 5) + 1;
        let x: nd::Array2<u32> = nd::Array2::zeros((2 * n + 1, over32));
        let z: nd::Array2<u32> = nd::Array2::zeros((2 * n + 1, over32));
        let r: nd::Array1<u8> = nd::Array1::zeros(2 * n + 1);
        let mut q = Self { n, x, z, r, over32 };
        let mut j: usize;
        for (i, (mut xi, mut zi)) in q.row_iter_mut().enumerate() {
            if i < n {
                xi[i >> 5] = PW[i & 31];
            } else if i < 2 * n {
                j = i - n;
                zi[j >> 5] = PW[j & 31];
            }
        }
        q
    }

    /// Create the computational basis state ∣*b*<sub>0</sub>...*b*<sub>*n* –
    /// 1</sub>⟩ from a string of measured bits.
    ///
    /// Fails with [`ShadowError::InvalidMeasurement`] if any bit is not 0 or
    /// 1.
    pub fn from_bits(bits: &[u8]) -> ShadowResult<Self> {
        let mut q = Self::new(bits.len());
        for (k, &b) in bits.iter().enumerate() {
            match b {
                0 => { },
                1 => { q.apply_x(k); },
                value => {
                    return Err(ShadowError::InvalidMeasurement { qubit: k, value });
                },
            }
        }
        Ok(q)
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    fn row_iter_mut(&mut self)
        -> impl Iterator<Item = (nd::ArrayViewMut1<u32>, nd::ArrayViewMut1<u32>)>
    {
        self.x.axis_iter_mut(nd::Axis(0))
            .zip(self.z.axis_iter_mut(nd::Axis(0)))
            .take(2 * self.n)
    }

    pub fn apply_h(&mut self, k: usize) -> &mut Self {
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        let mut tmp: u32;
        for ((x_i_k5, z_i_k5), r_i) in
            self.x.slice_mut(s![.., k5]).iter_mut()
                .zip(self.z.slice_mut(s![.., k5]).iter_mut())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            tmp = *x_i_k5;
            *x_i_k5 ^= (*x_i_k5 ^ *z_i_k5) & pw;
            *z_i_k5 ^= (*z_i_k5 ^ tmp) & pw;
            if *x_i_k5 & pw != 0 && *z_i_k5 & pw != 0 { *r_i = (*r_i + 2) % 4; }
        }
        self
    }

    pub fn apply_s(&mut self, k: usize) -> &mut Self {
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        for ((x_i_k5, z_i_k5), r_i) in
            self.x.slice_mut(s![.., k5]).iter_mut()
                .zip(self.z.slice_mut(s![.., k5]).iter_mut())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            if *x_i_k5 & pw != 0 && *z_i_k5 & pw != 0 { *r_i = (*r_i + 2) % 4; }
            *z_i_k5 ^= *x_i_k5 & pw;
        }
        self
    }

    pub fn apply_sinv(&mut self, k: usize) -> &mut Self {
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        for ((x_i_k5, z_i_k5), r_i) in
            self.x.slice_mut(s![.., k5]).iter_mut()
                .zip(self.z.slice_mut(s![.., k5]).iter_mut())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            if *x_i_k5 & pw != 0 && *z_i_k5 & pw == 0 { *r_i = (*r_i + 2) % 4; }
            *z_i_k5 ^= *x_i_k5 & pw;
        }
        self
    }

    // flip the sign of every row whose Pauli at `k` anticommutes with the
    // Pauli given by (`xp`, `zp`)
    fn flip_anticomm(&mut self, k: usize, xp: bool, zp: bool) -> &mut Self {
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];
        for ((x_i_k5, z_i_k5), r_i) in
            self.x.slice(s![.., k5]).iter()
                .zip(self.z.slice(s![.., k5]).iter())
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            let anti = (xp && *z_i_k5 & pw != 0) ^ (zp && *x_i_k5 & pw != 0);
            if anti { *r_i = (*r_i + 2) % 4; }
        }
        self
    }

    pub fn apply_x(&mut self, k: usize) -> &mut Self {
        self.flip_anticomm(k, true, false)
    }

    pub fn apply_y(&mut self, k: usize) -> &mut Self {
        self.flip_anticomm(k, true, true)
    }

    pub fn apply_z(&mut self, k: usize) -> &mut Self {
        self.flip_anticomm(k, false, true)
    }

    pub fn apply_cnot(&mut self, a: usize, b: usize) -> &mut Self {
        let a5: usize = a >> 5;
        let b5: usize = b >> 5;
        let pwa: u32 = PW[a & 31];
        let pwb: u32 = PW[b & 31];
        for ((mut x_i, mut z_i), r_i) in
            self.x.axis_iter_mut(nd::Axis(0))
                .zip(self.z.axis_iter_mut(nd::Axis(0)))
                .zip(self.r.iter_mut())
                .take(2 * self.n)
        {
            if x_i[a5] & pwa != 0 { x_i[b5] ^= pwb; }
            if z_i[b5] & pwb != 0 { z_i[a5] ^= pwa; }
            if x_i[a5] & pwa != 0 && z_i[b5] & pwb != 0
                && x_i[b5] & pwb != 0 && z_i[a5] & pwa != 0
            { *r_i = (*r_i + 2) % 4; }
            if x_i[a5] & pwa != 0 && z_i[b5] & pwb != 0
                && x_i[b5] & pwb == 0 && z_i[a5] & pwa == 0
            { *r_i = (*r_i + 2) % 4; }
        }
        self
    }

    pub fn apply_cz(&mut self, a: usize, b: usize) -> &mut Self {
        self.apply_h(b).apply_cnot(a, b).apply_h(b)
    }

    pub fn apply_swap(&mut self, a: usize, b: usize) -> &mut Self {
        self.apply_cnot(a, b).apply_cnot(b, a).apply_cnot(a, b)
    }

    /// Perform the action of a gate.
    ///
    /// Does nothing if any qubit indices are out of bounds.
    pub fn apply_gate(&mut self, gate: Gate) -> &mut Self {
        if !gate.is_valid(self.n) { return self; }
        match gate {
            Gate::H(k) => self.apply_h(k),
            Gate::X(k) => self.apply_x(k),
            Gate::Y(k) => self.apply_y(k),
            Gate::Z(k) => self.apply_z(k),
            Gate::S(k) => self.apply_s(k),
            Gate::SInv(k) => self.apply_sinv(k),
            Gate::CX(a, b) => self.apply_cnot(a, b),
            Gate::CZ(a, b) => self.apply_cz(a, b),
            Gate::Swap(a, b) => self.apply_swap(a, b),
        }
    }

    /// Perform a series of gates.
    pub fn apply_circuit<'a, I>(&mut self, gates: I) -> &mut Self
    where I: IntoIterator<Item = &'a Gate>
    {
        gates.into_iter().copied().for_each(|g| { self.apply_gate(g); });
        self
    }

    /// Return a copy of `self` evolved by a Clifford element, leaving `self`
    /// unchanged.
    ///
    /// Fails with [`ShadowError::CliffordQubitMismatch`] if `clifford` acts on
    /// a different number of qubits.
    pub fn evolve(&self, clifford: &Clifford) -> ShadowResult<Self> {
        if clifford.num_qubits() != self.n {
            return Err(ShadowError::CliffordQubitMismatch {
                clifford: clifford.num_qubits(),
                register: self.n,
            });
        }
        let mut new = self.clone();
        new.apply_circuit(clifford);
        Ok(new)
    }

    pub(crate) fn row_copy(&mut self, a: usize, b: usize) -> &mut Self {
        // set row b equal to row a
        for (mut x__j, mut z__j) in
            self.x.axis_iter_mut(nd::Axis(1))
                .zip(self.z.axis_iter_mut(nd::Axis(1)))
        {
            x__j[b] = x__j[a];
            z__j[b] = z__j[a];
        }
        self.r[b] = self.r[a];
        self
    }

    pub(crate) fn row_swap(&mut self, a: usize, b: usize) -> &mut Self {
        let n = self.n;
        self.row_copy(b, 2 * n)
            .row_copy(a, b)
            .row_copy(2 * n, a)
    }

    // set row k equal to the o-th observable (X_1, ... X_n, Z_1, ..., Z_n)
    pub(crate) fn row_set(&mut self, o: usize, k: usize) -> &mut Self {
        let o5: usize;
        let o31: usize;
        self.row_clear(k);
        if o < self.n {
            o5 = o >> 5;
            o31 = o & 31;
            self.x[[k, o5]] = PW[o31];
        } else {
            o5 = (o - self.n) >> 5;
            o31 = (o - self.n) & 31;
            self.z[[k, o5]] = PW[o31];
        }
        self
    }

    // set row k equal to the identity
    pub(crate) fn row_clear(&mut self, k: usize) -> &mut Self {
        self.x.slice_mut(s![k, ..]).fill(0);
        self.z.slice_mut(s![k, ..]).fill(0);
        self.r[k] = 0;
        self
    }

    // return the phase (0, ..., 3) when row b is left-multiplied by row a
    pub(crate) fn row_mul_phase(&self, a: usize, b: usize) -> u8 {
        let mut e: i32 = 0;
        let xa = self.x.slice(s![a, ..]);
        let xb = self.x.slice(s![b, ..]);
        let za = self.z.slice(s![a, ..]);
        let zb = self.z.slice(s![b, ..]);
        for ((&xaj, &xbj), (&zaj, &zbj)) in
            xa.iter().zip(xb).zip(za.iter().zip(zb))
        {
            for &pw in PW.iter() {
                if xaj & pw != 0 && zaj & pw == 0 {
                    if xbj & pw != 0 && zbj & pw != 0 { e += 1; }
                    if xbj & pw == 0 && zbj & pw != 0 { e -= 1; }
                }
                if xaj & pw != 0 && zaj & pw != 0 {
                    if xbj & pw == 0 && zbj & pw != 0 { e += 1; }
                    if xbj & pw != 0 && zbj & pw == 0 { e -= 1; }
                }
                if xaj & pw == 0 && zaj & pw != 0 {
                    if xbj & pw != 0 && zbj & pw == 0 { e += 1; }
                    if xbj & pw != 0 && zbj & pw != 0 { e -= 1; }
                }
            }
        }
        e = (e + i32::from(self.r[b]) + i32::from(self.r[a])).rem_euclid(4);
        e as u8
    }

    // left-multiply row b by row a
    pub(crate) fn row_mul(&mut self, a: usize, b: usize) -> &mut Self {
        self.r[b] = self.row_mul_phase(a, b);
        for (mut x__j, mut z__j) in
            self.x.axis_iter_mut(nd::Axis(1))
                .zip(self.z.axis_iter_mut(nd::Axis(1)))
        {
            x__j[b] ^= x__j[a];
            z__j[b] ^= z__j[a];
        }
        self
    }

    // perform a Z-basis measurement on qubit `k`, choosing the outcome with
    // `pick` only if it is random
    fn collapse<F>(&mut self, k: usize, pick: F) -> Outcome
    where F: FnOnce() -> bool
    {
        let n = self.n;
        let k5: usize = k >> 5;
        let pw: u32 = PW[k & 31];

        let maybe_p: Option<usize>
            = self.x.slice(s![n..2 * n, k5]).iter()
            .position(|x_qpn_k5| *x_qpn_k5 & pw != 0);

        if let Some(p) = maybe_p {
            self.row_copy(p + n, p);
            self.row_set(k + n, p + n);
            self.r[p + n] = 2 * u8::from(pick());
            for i in 0..2 * n {
                if i != p && self.x[[i, k5]] & pw != 0 { self.row_mul(p, i); }
            }
            if self.r[p + n] != 0 { Outcome::Rand1 } else { Outcome::Rand0 }
        } else {
            let m: usize
                = self.x.slice(s![..n, k5]).iter()
                .position(|x_q_k5| *x_q_k5 & pw != 0)
                .unwrap_or(n);
            self.row_clear(2 * n);
            if m < n {
                self.row_copy(m + n, 2 * n);
                for i in m + 1..n {
                    if self.x[[i, k5]] & pw != 0 { self.row_mul(i + n, 2 * n); }
                }
            }
            if self.r[2 * n] != 0 { Outcome::Det1 } else { Outcome::Det0 }
        }
    }

    /// Perform a projective measurement on a qubit `k` in the Z-basis,
    /// returning the outcome of the measurement.
    ///
    /// **Note**: this measurement is either deterministic (when the target
    /// qubit is ∣±z⟩) or random (otherwise). For post-selected measurements,
    /// see [`Self::project`].
    pub fn measure<R>(&mut self, k: usize, rng: &mut R) -> Outcome
    where R: Rng + ?Sized
    {
        self.collapse(k, || rng.gen::<bool>())
    }

    /// Project qubit `k` onto ∣0⟩ (`outcome == false`) or ∣1⟩ (`outcome ==
    /// true`), returning the probability of having observed that outcome.
    ///
    /// If the probability is zero, `self` is left unchanged.
    pub fn project(&mut self, k: usize, outcome: bool) -> f64 {
        match self.collapse(k, || outcome) {
            Outcome::Rand0 | Outcome::Rand1 => 0.5,
            Outcome::Det0 => if outcome { 0.0 } else { 1.0 },
            Outcome::Det1 => if outcome { 1.0 } else { 0.0 },
        }
    }

    /// Compute the overlap |⟨0...0∣ψ⟩|<sup>2</sup> by successive
    /// post-selection of each qubit on ∣0⟩.
    pub fn zero_overlap(&self) -> f64 {
        let mut state = self.clone();
        let mut prob: f64 = 1.0;
        for k in 0..self.n {
            prob *= state.project(k, false);
            if prob == 0.0 { break; }
        }
        prob
    }

    // pack a Pauli string into X- and Z-bit words
    fn pack_paulis(&self, ops: &[Pauli]) -> (Vec<u32>, Vec<u32>) {
        let mut px: Vec<u32> = vec![0; self.over32];
        let mut pz: Vec<u32> = vec![0; self.over32];
        for (j, op) in ops.iter().enumerate() {
            let (xj, zj) = op.xz();
            if xj { px[j >> 5] |= PW[j & 31]; }
            if zj { pz[j >> 5] |= PW[j & 31]; }
        }
        (px, pz)
    }

    // symplectic product of a packed Pauli with row i
    fn anticommutes_with_row(&self, px: &[u32], pz: &[u32], i: usize) -> bool {
        let xi = self.x.row(i);
        let zi = self.z.row(i);
        px.iter().zip(pz).zip(xi.iter().zip(zi.iter()))
            .map(|((&pxj, &pzj), (&xij, &zij))| {
                ((pxj & zij) ^ (pzj & xij)).count_ones()
            })
            .sum::<u32>() % 2 == 1
    }

    /// Compute the expectation value ⟨ψ∣*P*∣ψ⟩ of a Pauli string.
    ///
    /// For a stabilizer state this is always 0 or ±1: zero if *P* anticommutes
    /// with any stabilizer, otherwise the sign with which ±*P* appears in the
    /// stabilizer group. Fails with [`ShadowError::ObservableLength`] if `ops`
    /// does not cover exactly `n` qubits.
    pub fn pauli_expectation(&self, ops: &[Pauli]) -> ShadowResult<i8> {
        let n = self.n;
        if ops.len() != n {
            return Err(ShadowError::ObservableLength { expected: n, got: ops.len() });
        }
        let (px, pz) = self.pack_paulis(ops);
        if (n..2 * n).any(|i| self.anticommutes_with_row(&px, &pz, i)) {
            return Ok(0);
        }
        // P is ± the product of the stabilizers paired with every destabilizer
        // it anticommutes with
        let mut acc = self.clone();
        acc.row_clear(2 * n);
        for i in 0..n {
            if self.anticommutes_with_row(&px, &pz, i) { acc.row_mul(i + n, 2 * n); }
        }
        Ok(if acc.r[2 * n] == 0 { 1 } else { -1 })
    }

    /// Convert `self` to a more human-readable stabilizer/destabilizer group
    /// representation.
    pub fn as_group(&self) -> StabGroup {
        let mut j5: usize;
        let mut pw: u32;
        let mut npauli: NPauli
            = NPauli { phase: Phase::Pi0, ops: vec![Pauli::I; self.n] };
        let mut stab: Vec<NPauli> = vec![npauli.clone(); self.n];
        let mut destab: Vec<NPauli> = vec![npauli.clone(); self.n];
        let iter
            = self.x.axis_iter(nd::Axis(0))
            .zip(self.z.axis_iter(nd::Axis(0)))
            .zip(self.r.iter())
            .zip(destab.iter_mut().chain(stab.iter_mut()));
        for (((xi, zi), ri), g) in iter {
            npauli.phase = Phase::from_int(*ri);
            for (j, op) in npauli.ops.iter_mut().enumerate() {
                j5 = j >> 5;
                pw = PW[j & 31];
                *op = match (xi[j5] & pw != 0, zi[j5] & pw != 0) {
                    (false, false) => Pauli::I,
                    (true,  false) => Pauli::X,
                    (true,  true ) => Pauli::Y,
                    (false, true ) => Pauli::Z,
                };
            }
            *g = npauli.clone();
        }
        StabGroup { stab, destab }
    }

    // do Gaussian elimination to put the stabilizer generators in the following
    // form:
    // - at the top, a minimal set of generators containins X's and Y's, in
    //   "quasi-upper-triangular" form
    // - at the bottom, generators containins Z's only in
    //   quasi-upper-triangular form
    //
    // returns the number of such generators, equal to the log_2 of the number
    // of nonzero basis states
    fn gaussian_elim(&mut self) -> usize {
        let n = self.n;
        let mut j5: usize;
        let mut pw: u32;
        let mut i: usize = n;
        for j in 0..n {
            j5 = j >> 5;
            pw = PW[j & 31];
            if let Some(k) = (i..2 * n).find(|q| self.x[[*q, j5]] & pw != 0) {
                self.row_swap(k, i);
                self.row_swap(k - n, i - n);
                for k2 in i + 1..2 * n {
                    if self.x[[k2, j5]] & pw != 0 {
                        self.row_mul(i, k2);
                        self.row_mul(k2 - n, i - n);
                    }
                }
                i += 1;
            }
        }
        let g: usize = i - n;
        for j in 0..n {
            j5 = j >> 5;
            pw = PW[j & 31];
            if let Some(k) = (i..2 * n).find(|q| self.z[[*q, j5]] & pw != 0) {
                self.row_swap(k, i);
                self.row_swap(k - n, i - n);
                for k2 in i + 1..2 * n {
                    if self.z[[k2, j5]] & pw != 0 {
                        self.row_mul(i, k2);
                        self.row_mul(k2 - n, i - n);
                    }
                }
                i += 1;
            }
        }
        g
    }

    // finds a Pauli operator P such that the basis state P |0...0> occurs with
    // nonzero amplitude, and writes P to the scratch row.
    //
    // self.gaussian_elim should be called before this method (and its output
    // should be provided as argument)
    fn seed_scratch(&mut self, g: usize) {
        let n = self.n;
        self.row_clear(2 * n);

        let mut f: u8;
        let mut j5: usize;
        let mut pw: u32;
        let mut min: usize = 0;
        for i in (n + g..2 * n).rev() {
            f = self.r[i];
            for j in (0..n).rev() {
                j5 = j >> 5;
                pw = PW[j & 31];
                if self.z[[i, j5]] & pw != 0 {
                    min = j;
                    if self.x[[2 * n, j5]] & pw != 0 { f = (f + 2) % 4; }
                }
            }
            if f % 4 == 2 {
                j5 = min >> 5;
                pw = PW[min & 31];
                self.x[[2 * n, j5]] ^= pw;
            }
        }
    }

    // returns the result of applying the Pauli operator in the scratch row to
    // |0...0> as a basis state
    fn as_basis_state(&self) -> BasisState {
        let n = self.n;
        let mut j5: usize;
        let mut pw: u32;
        let mut e: u8 = self.r[2 * n];
        for j in 0..n {
            j5 = j >> 5;
            pw = PW[j & 31];
            if self.x[[2 * n, j5]] & pw != 0 && self.z[[2 * n, j5]] & pw != 0 {
                e = (e + 1) % 4;
            }
        }
        let phase = Phase::from_int(e);
        let state: Vec<bool>
            = (0..n)
            .map(|j| self.x[[2 * n, j >> 5]] & PW[j & 31] != 0)
            .collect();
        BasisState { phase, state }
    }

    /// Perform Gaussian elimination and construct a basis state-based
    /// representation of `self`.
    ///
    /// The represented state is unchanged, but the generators of the tableau
    /// are rewritten. Fails if the number of non-zero terms in the
    /// representation is greater than 2^31.
    pub fn as_kets(&mut self) -> Option<Vec<BasisState>> {
        let n = self.n;
        let g = self.gaussian_elim();
        if g > 31 { return None; }
        let mut acc: Vec<BasisState> = Vec::with_capacity(1_usize << g);
        self.seed_scratch(g);
        acc.push(self.as_basis_state());
        let mut t2: u32;
        for t in 0..PW[g] - 1 {
            t2 = t ^ (t + 1);
            for (i, pw) in PW.iter().enumerate().take(g) {
                if t2 & pw != 0 { self.row_mul(n + i, 2 * n); }
            }
            acc.push(self.as_basis_state());
        }
        Some(acc)
    }

    fn check_dense(&self) -> ShadowResult<()> {
        if self.n > MAX_DENSE_QUBITS {
            Err(ShadowError::DenseTooLarge { n: self.n, max: MAX_DENSE_QUBITS })
        } else {
            Ok(())
        }
    }

    /// Convert to a dense state vector, with qubit 0 as the most significant
    /// bit of each basis index.
    ///
    /// The global phase is arbitrary.
    pub fn to_statevector(&self) -> ShadowResult<na::DVector<C64>> {
        self.check_dense()?;
        let kets
            = self.clone().as_kets()
            .ok_or(ShadowError::DenseTooLarge { n: self.n, max: MAX_DENSE_QUBITS })?;
        let norm = (kets.len() as f64).sqrt();
        let mut psi: na::DVector<C64> = na::DVector::zeros(1 << self.n);
        for ket in kets.iter() {
            psi[ket.index()] += ket.phase.as_complex() / norm;
        }
        Ok(psi)
    }

    /// Convert to a dense density matrix ∣ψ⟩⟨ψ∣, with qubit 0 as the most
    /// significant bit of each basis index.
    ///
    /// All elements are computed exactly as (powers of *i*) / 2<sup>*g*</sup>.
    pub fn to_density_matrix(&self) -> ShadowResult<na::DMatrix<C64>> {
        self.check_dense()?;
        let kets
            = self.clone().as_kets()
            .ok_or(ShadowError::DenseTooLarge { n: self.n, max: MAX_DENSE_QUBITS })?;
        let norm = kets.len() as f64;
        let dim: usize = 1 << self.n;
        let mut rho: na::DMatrix<C64> = na::DMatrix::zeros(dim, dim);
        for a in kets.iter() {
            let ia = a.index();
            for b in kets.iter() {
                let e = a.phase.to_int() + 4 - b.phase.to_int();
                rho[(ia, b.index())] += Phase::from_int(e).as_complex() / norm;
            }
        }
        Ok(rho)
    }
}

/// A single `n`-qubit Pauli operator with a phase.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct NPauli {
    pub phase: Phase,
    pub ops: Vec<Pauli>,
}

impl fmt::Display for NPauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.phase)?;
        self.ops.iter()
            .try_for_each(|p| fmt::Display::fmt(p, f))
    }
}

/// The complete `n`-qubit stabilizer/destabilizer groups for a given state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StabGroup {
    pub stab: Vec<NPauli>,
    pub destab: Vec<NPauli>,
}

impl fmt::Display for StabGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.stab.len();
        for (k, (stab, destab)) in
            self.stab.iter().zip(&self.destab).enumerate()
        {
            fmt::Display::fmt(stab, f)?;
            write!(f, " | ")?;
            fmt::Display::fmt(destab, f)?;
            if k + 1 < n { writeln!(f)?; }
        }
        Ok(())
    }
}

/// A single basis state in the product space of `n` qubits, with a phase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisState {
    pub phase: Phase,
    /// `true` for ∣1⟩
    pub state: Vec<bool>,
}

impl BasisState {
    /// Return the index of `self` in the computational basis, with qubit 0 as
    /// the most significant bit.
    pub fn index(&self) -> usize {
        self.state.iter()
            .fold(0, |acc, b| (acc << 1) | usize::from(*b))
    }
}

impl fmt::Display for BasisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phase)?;
        write!(f, "∣")?;
        for b in self.state.iter() { write!(f, "{}", u8::from(*b))?; }
        write!(f, "⟩")?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{ SeedableRng, rngs::StdRng };

    fn npauli(phase: Phase, s: &str) -> NPauli {
        let ops
            = s.chars()
            .map(|c| match c {
                'I' => Pauli::I,
                'X' => Pauli::X,
                'Y' => Pauli::Y,
                'Z' => Pauli::Z,
                _ => unreachable!(),
            })
            .collect();
        NPauli { phase, ops }
    }

    fn bell() -> Stab {
        let mut q = Stab::new(2);
        q.apply_h(0).apply_cnot(0, 1);
        q
    }

    #[test]
    fn bell_group() {
        let group = bell().as_group();
        assert_eq!(
            group.stab,
            vec![npauli(Phase::Pi0, "XX"), npauli(Phase::Pi0, "ZZ")],
        );
        assert_eq!(
            group.destab,
            vec![npauli(Phase::Pi0, "ZI"), npauli(Phase::Pi0, "IX")],
        );
        assert_eq!(group.to_string(), "+1 XX | +1 ZI\n+1 ZZ | +1 IX");
        assert_eq!(format!("{:#}", npauli(Phase::Pi, "XI")), "-1 X.");
    }

    #[test]
    fn single_qubit_signs() {
        // Y∣0⟩ = i∣1⟩ is stabilized by -Z
        let mut q = Stab::new(1);
        q.apply_y(0);
        assert_eq!(q.as_group().stab, vec![npauli(Phase::Pi, "Z")]);

        // S∣+⟩ = ∣+i⟩ is stabilized by +Y
        let mut q = Stab::new(1);
        q.apply_h(0).apply_s(0);
        assert_eq!(q.as_group().stab, vec![npauli(Phase::Pi0, "Y")]);

        // S†∣+⟩ = ∣-i⟩ is stabilized by -Y
        let mut q = Stab::new(1);
        q.apply_h(0).apply_sinv(0);
        assert_eq!(q.as_group().stab, vec![npauli(Phase::Pi, "Y")]);

        let mut q = Stab::new(3);
        let init = q.clone();
        q.apply_s(1).apply_sinv(1);
        assert_eq!(q, init);
    }

    #[test]
    fn bell_density_matrix() {
        let rho = bell().to_density_matrix().unwrap();
        let half = C64::from(0.5);
        let zero = C64::from(0.0);
        for i in 0..4 {
            for j in 0..4 {
                let expected
                    = if (i == 0 || i == 3) && (j == 0 || j == 3) { half }
                    else { zero };
                assert_eq!(rho[(i, j)], expected);
            }
        }
        let psi = bell().to_statevector().unwrap();
        assert!((psi[0].norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((psi[3].norm() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        assert!(psi[1].norm() < 1e-12 && psi[2].norm() < 1e-12);
    }

    #[test]
    fn basis_state_indexing() {
        let q = Stab::from_bits(&[1, 0, 1]).unwrap();
        let rho = q.to_density_matrix().unwrap();
        assert_eq!(rho[(0b101, 0b101)], C64::from(1.0));
        assert_eq!(rho.iter().filter(|z| z.norm() > 0.0).count(), 1);
        assert!(matches!(
            Stab::from_bits(&[0, 2]),
            Err(ShadowError::InvalidMeasurement { qubit: 1, value: 2 })
        ));
    }

    #[test]
    fn pauli_expectations() {
        use Pauli::*;
        let q = bell();
        assert_eq!(q.pauli_expectation(&[X, X]).unwrap(), 1);
        assert_eq!(q.pauli_expectation(&[Z, Z]).unwrap(), 1);
        assert_eq!(q.pauli_expectation(&[Y, Y]).unwrap(), -1);
        assert_eq!(q.pauli_expectation(&[I, I]).unwrap(), 1);
        assert_eq!(q.pauli_expectation(&[X, I]).unwrap(), 0);
        assert_eq!(q.pauli_expectation(&[Z, Y]).unwrap(), 0);
        assert!(matches!(
            q.pauli_expectation(&[X]),
            Err(ShadowError::ObservableLength { expected: 2, got: 1 })
        ));

        let q = Stab::from_bits(&[1, 0]).unwrap();
        assert_eq!(q.pauli_expectation(&[Z, I]).unwrap(), -1);
        assert_eq!(q.pauli_expectation(&[Z, Z]).unwrap(), -1);
        assert_eq!(q.pauli_expectation(&[I, Z]).unwrap(), 1);
    }

    #[test]
    fn zero_overlaps() {
        assert_eq!(Stab::new(3).zero_overlap(), 1.0);
        assert_eq!(bell().zero_overlap(), 0.5);
        assert_eq!(Stab::from_bits(&[0, 1]).unwrap().zero_overlap(), 0.0);
        let mut q = Stab::new(2);
        q.apply_h(0).apply_h(1);
        assert_eq!(q.zero_overlap(), 0.25);
        // overlap is computed on a copy
        let q = bell();
        let _ = q.zero_overlap();
        assert_eq!(q, bell());
    }

    #[test]
    fn measurement_correlations() {
        let mut rng = StdRng::seed_from_u64(10546);
        for _ in 0..50 {
            let mut q = bell();
            let a = q.measure(0, &mut rng);
            let b = q.measure(1, &mut rng);
            assert!(matches!(a, Outcome::Rand0 | Outcome::Rand1));
            assert!(matches!(b, Outcome::Det0 | Outcome::Det1));
            assert_eq!(a.is_one(), b.is_one());
        }
        let mut q = Stab::from_bits(&[0, 1]).unwrap();
        assert_eq!(q.measure(1, &mut rng), Outcome::Det1);
        assert_eq!(q.measure(0, &mut rng), Outcome::Det0);
    }

    #[test]
    fn evolve_checks_size() {
        let c = Clifford::new(2, [Gate::H(0), Gate::CX(0, 1)]).unwrap();
        let q = Stab::new(2);
        assert_eq!(q.evolve(&c).unwrap(), bell());
        assert_eq!(q, Stab::new(2));
        assert!(matches!(
            Stab::new(3).evolve(&c),
            Err(ShadowError::CliffordQubitMismatch { clifford: 2, register: 3 })
        ));
        assert!(matches!(
            Stab::new(MAX_DENSE_QUBITS + 1).to_density_matrix(),
            Err(ShadowError::DenseTooLarge { .. })
        ));
    }
}
