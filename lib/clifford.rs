//! Elements of the *n*-qubit Clifford group as validated gate sequences.

use itertools::Itertools;
use rand::Rng;
use crate::{
    error::{ ShadowError, ShadowResult },
    gate::{ Gate, Pauli },
    stab::{ Stab, StabGroup },
};

/// A series of [`Gate`]s implementing an element of the `n`-qubit Clifford
/// group.
///
/// All gates sourced from this type are guaranteed to apply to qubit indices
/// less than `n` and all two-qubit gate indices are guaranteed to be
/// non-equal. Gates are applied in iteration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Clifford {
    n: usize,
    gates: Vec<Gate>,
}

impl IntoIterator for Clifford {
    type Item = Gate;
    type IntoIter = <Vec<Gate> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.gates.into_iter() }
}

impl<'a> IntoIterator for &'a Clifford {
    type Item = &'a Gate;
    type IntoIter = <&'a Vec<Gate> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter { self.gates.iter() }
}

impl Clifford {
    /// Convert a series of gates to a new `n`-qubit Clifford circuit, verifying
    /// that all qubit indices are less than `n` and that all two-qubit gate
    /// indices are non-equal.
    ///
    /// Fails with [`ShadowError::InvalidGate`] on the first gate for which the
    /// above conditions do not hold.
    pub fn new<I>(n: usize, gates: I) -> ShadowResult<Self>
    where I: IntoIterator<Item = Gate>
    {
        let gates: Vec<Gate> = gates.into_iter().collect();
        if let Some(gate) = gates.iter().find(|g| !g.is_valid(n)) {
            return Err(ShadowError::InvalidGate { gate: *gate, n });
        }
        Ok(Self { n, gates })
    }

    /// The identity element, containing no gates.
    pub fn identity(n: usize) -> Self { Self { n, gates: Vec::new() } }

    /// Return a swap network that reverses the order of `n` qubits, mapping
    /// qubit `k` to qubit `n - 1 - k`.
    ///
    /// The network is its own inverse.
    pub fn reversal(n: usize) -> Self {
        let gates: Vec<Gate>
            = (0..n / 2).map(|k| Gate::Swap(k, n - 1 - k)).collect();
        Self { n, gates }
    }

    pub fn num_qubits(&self) -> usize { self.n }

    pub fn len(&self) -> usize { self.gates.len() }

    pub fn is_empty(&self) -> bool { self.gates.is_empty() }

    pub fn gates(&self) -> &[Gate] { &self.gates }

    /// Return the composition `self ∘ other`, which applies `other` first.
    ///
    /// Fails with [`ShadowError::CliffordQubitMismatch`] if `other` acts on a
    /// different number of qubits.
    pub fn compose(&self, other: &Self) -> ShadowResult<Self> {
        if other.n != self.n {
            return Err(ShadowError::CliffordQubitMismatch {
                clifford: other.n,
                register: self.n,
            });
        }
        let gates: Vec<Gate>
            = other.gates.iter().chain(self.gates.iter()).copied().collect();
        Ok(Self { n: self.n, gates })
    }

    /// Return the inverse element, as the reversed sequence of inverted gates.
    pub fn adjoint(&self) -> Self {
        let gates: Vec<Gate>
            = self.gates.iter().rev().map(|g| g.inverse()).collect();
        Self { n: self.n, gates }
    }

    /// Return the images of all *X*<sub>*j*</sub> (in
    /// [`destab`][StabGroup::destab]) and *Z*<sub>*j*</sub> (in
    /// [`stab`][StabGroup::stab]) under conjugation by `self`, including
    /// signs.
    ///
    /// Two gate sequences have equal tableaux if and only if they implement
    /// the same unitary up to a global phase.
    pub fn tableau(&self) -> StabGroup {
        let mut state = Stab::new(self.n);
        state.apply_circuit(self);
        state.as_group()
    }

    /// Return `true` if `self` and `other` implement the same operation up to
    /// a global phase.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.n == other.n && self.tableau() == other.tableau()
    }

    /// Generates a uniformly random element of the `n`-qubit Clifford group as
    /// a particular sequence of [`Gate`]s.
    ///
    /// See also: [arXiv:2008.06011](https://arxiv.org/abs/2008.06011)
    pub fn gen<R>(n: usize, rng: &mut R) -> Self
    where R: Rng + ?Sized
    {
        // The `n`-qubit Clifford group is the set of operations that map Pauli
        // strings to Pauli strings under conjugation, so an element is fixed
        // by where it sends each X_j and Z_j. Each stage draws a random pair
        // of anticommuting Paulis on the qubits not yet fixed, then finds a
        // circuit that sends that pair to (X_llim, Z_llim) and appends it.
        let mut tab = Tableau::new(n);
        for llim in 0..n {
            let (p0, p1) = sample_anticomm_pair(n - llim, rng);
            tab.init_with(llim, &p0, &p1, [rng.gen(), rng.gen()]);
            tab.sweep(llim);
        }
        Self { n, gates: tab.unpack() }
    }
}

// draw a uniformly random pair of anticommuting `m`-qubit Pauli strings, the
// first of which is not the identity
fn sample_anticomm_pair<R>(m: usize, rng: &mut R) -> (Vec<Pauli>, Vec<Pauli>)
where R: Rng + ?Sized
{
    let p0: Vec<Pauli>
        = loop {
            let p = Pauli::gen_nqubit(m, rng);
            if p.iter().any(|pk| *pk != Pauli::I) { break p; }
        };
    let p1: Vec<Pauli>
        = loop {
            let p = Pauli::gen_nqubit(m, rng);
            let n_anti_comm
                = p0.iter().zip(&p)
                .filter(|(p0k, pk)| !p0k.commutes_with(**pk))
                .count();
            if n_anti_comm % 2 == 1 { break p; }
        };
    (p0, p1)
}

// two-row signed Pauli tableau tracking the images of a Pauli pair under a
// growing circuit
#[derive(Clone, Debug)]
struct Tableau {
    tabx: Vec<[bool; 2]>,
    tabz: Vec<[bool; 2]>,
    sign: [bool; 2],
    circuit: Vec<Gate>,
}

impl Tableau {
    fn new(n: usize) -> Self {
        Self {
            tabx: vec![[false; 2]; n],
            tabz: vec![[false; 2]; n],
            sign: [false; 2],
            circuit: Vec::new(),
        }
    }

    // load a pair acting on qubits `llim..`; everything below `llim` is
    // cleared
    fn init_with(&mut self, llim: usize, p0: &[Pauli], p1: &[Pauli], sign: [bool; 2]) {
        self.tabx.iter_mut().for_each(|txj| { *txj = [false; 2]; });
        self.tabz.iter_mut().for_each(|tzj| { *tzj = [false; 2]; });
        let iter
            = p0.iter().zip(p1)
            .zip(self.tabx.iter_mut().zip(self.tabz.iter_mut()).skip(llim));
        for ((p0j, p1j), (txj, tzj)) in iter {
            (txj[0], tzj[0]) = p0j.xz();
            (txj[1], tzj[1]) = p1j.xz();
        }
        self.sign = sign;
    }

    fn iter_xz(&self) -> impl Iterator<Item = (&[bool; 2], &[bool; 2])> + '_ {
        self.tabx.iter().zip(self.tabz.iter())
    }

    fn h(&mut self, j: usize) {
        std::mem::swap(&mut self.tabx[j], &mut self.tabz[j]);
        self.sign[0] ^= self.tabx[j][0] && self.tabz[j][0];
        self.sign[1] ^= self.tabx[j][1] && self.tabz[j][1];
        self.circuit.push(Gate::H(j));
    }

    fn s(&mut self, j: usize) {
        self.sign[0] ^= self.tabx[j][0] && self.tabz[j][0];
        self.sign[1] ^= self.tabx[j][1] && self.tabz[j][1];
        self.tabz[j][0] ^= self.tabx[j][0];
        self.tabz[j][1] ^= self.tabx[j][1];
        self.circuit.push(Gate::S(j));
    }

    fn cnot(&mut self, c: usize, j: usize) {
        for row in 0..2 {
            self.tabx[j][row] ^= self.tabx[c][row];
            self.tabz[c][row] ^= self.tabz[j][row];
            let (xc, zc) = (self.tabx[c][row], self.tabz[c][row]);
            let (xj, zj) = (self.tabx[j][row], self.tabz[j][row]);
            self.sign[row] ^= xc && zj && xj && zc;
            self.sign[row] ^= xc && zj && !xj && !zc;
        }
        self.circuit.push(Gate::CX(c, j));
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.tabx.swap(a, b);
        self.tabz.swap(a, b);
        self.circuit.push(Gate::Swap(a, b));
    }

    // steps (1) and (2): reduce `row` on qubits `llim..` to a single X,
    // returning the qubit it lands on
    fn reduce_row(&mut self, llim: usize, row: usize) -> Option<usize> {
        // (1)
        // clear z: H
        let idx: Vec<usize>
            = self.iter_xz().enumerate().skip(llim)
            .filter(|(_, (txj, tzj))| tzj[row] && !txj[row])
            .map(|(j, _)| j)
            .collect();
        idx.into_iter().for_each(|j| { self.h(j); });
        // clear z: S
        let idx: Vec<usize>
            = self.iter_xz().enumerate().skip(llim)
            .filter(|(_, (txj, tzj))| tzj[row] && txj[row])
            .map(|(j, _)| j)
            .collect();
        idx.into_iter().for_each(|j| { self.s(j); });

        // (2)
        // clear x, all but one: CNOTs
        let mut idx: Vec<usize>
            = self.iter_xz().enumerate().skip(llim)
            .filter(|(_, (txj, _))| txj[row])
            .map(|(j, _)| j)
            .collect();
        while idx.len() > 1 {
            idx = idx.into_iter()
                .chunks(2).into_iter()
                .map(|mut chunk| {
                    let Some(a) = chunk.next() else { unreachable!() };
                    if let Some(b) = chunk.next() { self.cnot(a, b); }
                    a
                })
                .collect();
        }
        idx.first().copied()
    }

    fn sweep(&mut self, llim: usize) {
        // (1), (2), and (3)
        // move the remaining x in the top row to the leftmost column
        if let Some(j) = self.reduce_row(llim, 0) {
            if j != llim { self.swap(j, llim); }
        }

        // (4)
        // apply a hadamard if the bottom row is not Z_llim
        let is_z
            = !self.tabx[llim][1] && self.tabz[llim][1]
            && self.iter_xz().skip(llim + 1).all(|(txj, tzj)| !txj[1] && !tzj[1]);
        if !is_z {
            self.h(llim);
            // repeat (1) and (2) for the bottom row; the leftover X is always
            // on `llim`
            self.reduce_row(llim, 1);
            self.h(llim);
        }

        // (5)
        // clear signs
        match self.sign {
            [false, false] => { },
            [false, true ] => { self.circuit.push(Gate::X(llim)); },
            [true,  false] => { self.circuit.push(Gate::Z(llim)); },
            [true,  true ] => { self.circuit.push(Gate::Y(llim)); },
        }
    }

    fn unpack(self) -> Vec<Gate> { self.circuit }
}
