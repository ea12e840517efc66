// src/strategy/simplex.rs

//! Dense two-phase simplex for small linear programs.
//!
//! Problems are stated as: minimise `c · x` subject to rows `a · x (<=|>=|=) b`
//! and `x >= 0`. Bland's rule picks entering and leaving columns, so the
//! method cannot cycle.

const EPS: f64 = 1e-9;
const MAX_PIVOTS: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SolveError {
    #[error("no point satisfies every constraint")]
    Infeasible,
    #[error("objective is unbounded below")]
    Unbounded,
    #[error("pivot limit reached")]
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub values: Vec<f64>,
    pub objective: f64,
}

/// A minimisation problem over non-negative variables.
#[derive(Debug, Clone, Default)]
pub struct LinearProgram {
    objective: Vec<f64>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn minimize(objective: Vec<f64>) -> Self {
        Self {
            objective,
            constraints: Vec::new(),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    /// Adds `coefficients · x relation rhs`. Missing trailing coefficients are zero.
    pub fn constrain(&mut self, mut coefficients: Vec<f64>, relation: Relation, rhs: f64) {
        coefficients.resize(self.objective.len(), 0.0);
        self.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });
    }

    /// Convenience for `x[var] <= bound`.
    pub fn upper_bound(&mut self, var: usize, bound: f64) {
        let mut row = vec![0.0; self.objective.len()];
        row[var] = 1.0;
        self.constrain(row, Relation::LessEq, bound);
    }

    pub fn solve(&self) -> Result<Solution, SolveError> {
        let n = self.objective.len();
        let m = self.constraints.len();

        // Normalise so every right-hand side is non-negative.
        let rows: Vec<(Vec<f64>, Relation, f64)> = self
            .constraints
            .iter()
            .map(|c| {
                if c.rhs < 0.0 {
                    let flipped = match c.relation {
                        Relation::LessEq => Relation::GreaterEq,
                        Relation::GreaterEq => Relation::LessEq,
                        Relation::Equal => Relation::Equal,
                    };
                    (c.coefficients.iter().map(|a| -a).collect(), flipped, -c.rhs)
                } else {
                    (c.coefficients.clone(), c.relation, c.rhs)
                }
            })
            .collect();

        let n_slack = rows.iter().filter(|r| r.1 != Relation::Equal).count();
        let n_art = rows.iter().filter(|r| r.1 != Relation::LessEq).count();
        let first_artificial = n + n_slack;
        let width = first_artificial + n_art;

        let mut tableau = Tableau {
            rows: vec![vec![0.0; width + 1]; m],
            basis: vec![0; m],
            width,
        };

        let mut slack = n;
        let mut artificial = first_artificial;
        for (i, (coefficients, relation, rhs)) in rows.into_iter().enumerate() {
            let row = &mut tableau.rows[i];
            row[..n].copy_from_slice(&coefficients);
            row[width] = rhs;
            match relation {
                Relation::LessEq => {
                    row[slack] = 1.0;
                    tableau.basis[i] = slack;
                    slack += 1;
                }
                Relation::GreaterEq => {
                    row[slack] = -1.0;
                    slack += 1;
                    row[artificial] = 1.0;
                    tableau.basis[i] = artificial;
                    artificial += 1;
                }
                Relation::Equal => {
                    row[artificial] = 1.0;
                    tableau.basis[i] = artificial;
                    artificial += 1;
                }
            }
        }

        // Phase 1: drive the artificials to zero.
        if n_art > 0 {
            let mut cost = vec![0.0; width];
            for c in cost.iter_mut().skip(first_artificial) {
                *c = 1.0;
            }
            tableau.optimize(&cost, width)?;

            let infeasibility: f64 = (0..m)
                .map(|i| cost[tableau.basis[i]] * tableau.rows[i][width])
                .sum();
            let scale = 1.0 + self.constraints.iter().map(|c| c.rhs.abs()).fold(0.0, f64::max);
            if infeasibility > EPS * scale {
                return Err(SolveError::Infeasible);
            }

            // Pivot any zero-valued artificial out of the basis. Rows with no
            // usable column are redundant and stay put; they never re-enter
            // a ratio test because their entries are all zero.
            for i in 0..m {
                if tableau.basis[i] >= first_artificial {
                    if let Some(j) = (0..first_artificial).find(|&j| tableau.rows[i][j].abs() > EPS) {
                        tableau.pivot(i, j);
                    }
                }
            }
        }

        // Phase 2: the real objective, artificials barred from entering.
        let mut cost = vec![0.0; width];
        cost[..n].copy_from_slice(&self.objective);
        tableau.optimize(&cost, first_artificial)?;

        let mut values = vec![0.0; n];
        for (i, &b) in tableau.basis.iter().enumerate() {
            if b < n {
                values[b] = tableau.rows[i][width].max(0.0);
            }
        }
        let objective = values
            .iter()
            .zip(&self.objective)
            .map(|(x, c)| x * c)
            .sum();

        Ok(Solution { values, objective })
    }
}

struct Tableau {
    rows: Vec<Vec<f64>>,
    basis: Vec<usize>,
    width: usize,
}

impl Tableau {
    /// Pivots until no column below `allowed` has a negative reduced cost.
    fn optimize(&mut self, cost: &[f64], allowed: usize) -> Result<(), SolveError> {
        for _ in 0..MAX_PIVOTS {
            let entering = (0..allowed)
                .filter(|j| !self.basis.contains(j))
                .find(|&j| self.reduced_cost(cost, j) < -EPS);
            let Some(col) = entering else {
                return Ok(());
            };

            let mut leaving: Option<(usize, f64)> = None;
            for (i, row) in self.rows.iter().enumerate() {
                if row[col] > EPS {
                    let ratio = row[self.width] / row[col];
                    let better = match leaving {
                        None => true,
                        Some((best, best_ratio)) => {
                            ratio < best_ratio - EPS
                                || ((ratio - best_ratio).abs() <= EPS
                                    && self.basis[i] < self.basis[best])
                        }
                    };
                    if better {
                        leaving = Some((i, ratio));
                    }
                }
            }
            let Some((row, _)) = leaving else {
                return Err(SolveError::Unbounded);
            };
            self.pivot(row, col);
        }
        Err(SolveError::IterationLimit)
    }

    fn reduced_cost(&self, cost: &[f64], col: usize) -> f64 {
        let priced: f64 = self
            .rows
            .iter()
            .zip(&self.basis)
            .map(|(row, &b)| cost[b] * row[col])
            .sum();
        cost[col] - priced
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.rows[row][col];
        for v in self.rows[row].iter_mut() {
            *v /= p;
        }
        let pivot_row = self.rows[row].clone();
        for (i, r) in self.rows.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = r[col];
            if factor.abs() > 0.0 {
                for (v, pv) in r.iter_mut().zip(&pivot_row) {
                    *v -= factor * pv;
                }
            }
        }
        self.basis[row] = col;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn textbook_maximisation() {
        // max 3x + 5y  s.t.  x <= 4, 2y <= 12, 3x + 2y <= 18
        let mut lp = LinearProgram::minimize(vec![-3.0, -5.0]);
        lp.upper_bound(0, 4.0);
        lp.constrain(vec![0.0, 2.0], Relation::LessEq, 12.0);
        lp.constrain(vec![3.0, 2.0], Relation::LessEq, 18.0);

        let sol = lp.solve().unwrap();
        assert!(close(sol.values[0], 2.0));
        assert!(close(sol.values[1], 6.0));
        assert!(close(sol.objective, -36.0));
    }

    #[test]
    fn covering_constraints_need_phase_one() {
        // min 2x + 3y  s.t.  x + y >= 10, x <= 4
        let mut lp = LinearProgram::minimize(vec![2.0, 3.0]);
        lp.constrain(vec![1.0, 1.0], Relation::GreaterEq, 10.0);
        lp.upper_bound(0, 4.0);

        let sol = lp.solve().unwrap();
        assert!(close(sol.values[0], 4.0));
        assert!(close(sol.values[1], 6.0));
        assert!(close(sol.objective, 26.0));
    }

    #[test]
    fn equality_rows() {
        // min x + y  s.t.  x - y = 2, x + y >= 4
        let mut lp = LinearProgram::minimize(vec![1.0, 1.0]);
        lp.constrain(vec![1.0, -1.0], Relation::Equal, 2.0);
        lp.constrain(vec![1.0, 1.0], Relation::GreaterEq, 4.0);

        let sol = lp.solve().unwrap();
        assert!(close(sol.values[0], 3.0));
        assert!(close(sol.values[1], 1.0));
    }

    #[test]
    fn negative_rhs_is_normalised() {
        // -x <= -5 is x >= 5
        let mut lp = LinearProgram::minimize(vec![1.0]);
        lp.constrain(vec![-1.0], Relation::LessEq, -5.0);
        let sol = lp.solve().unwrap();
        assert!(close(sol.values[0], 5.0));
    }

    #[test]
    fn detects_infeasibility() {
        let mut lp = LinearProgram::minimize(vec![1.0]);
        lp.constrain(vec![1.0], Relation::GreaterEq, 10.0);
        lp.upper_bound(0, 5.0);
        assert_eq!(lp.solve(), Err(SolveError::Infeasible));
    }

    #[test]
    fn detects_unboundedness() {
        let mut lp = LinearProgram::minimize(vec![-1.0, 0.0]);
        lp.constrain(vec![0.0, 1.0], Relation::LessEq, 3.0);
        assert_eq!(lp.solve(), Err(SolveError::Unbounded));
    }

    #[test]
    fn no_constraints_with_positive_costs_is_zero() {
        let lp = LinearProgram::minimize(vec![1.0, 2.0]);
        let sol = lp.solve().unwrap();
        assert_eq!(sol.values, vec![0.0, 0.0]);
    }

    #[test]
    fn redundant_equalities_are_tolerated() {
        let mut lp = LinearProgram::minimize(vec![1.0, 1.0]);
        lp.constrain(vec![1.0, 1.0], Relation::Equal, 6.0);
        lp.constrain(vec![2.0, 2.0], Relation::Equal, 12.0);
        let sol = lp.solve().unwrap();
        assert!(close(sol.values[0] + sol.values[1], 6.0));
    }
}
