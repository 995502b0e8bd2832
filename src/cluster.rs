//! Average-linkage (UPGMA) hierarchical clustering for heatmap ordering
//!
//! Node numbering follows the usual linkage convention: leaves are `0..n`,
//! and the cluster created by merge `k` gets id `n + k`.

use ndarray::{Array2, ArrayView1};

/// One agglomeration step
#[derive(Clone, Debug, PartialEq)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    /// Average Euclidean distance between the two clusters
    pub height: f64,
    /// Number of leaves under the new node
    pub size: usize,
}

/// Result of clustering `n` observations
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dendrogram {
    pub n_leaves: usize,
    /// `n_leaves - 1` merges in order of increasing height
    pub merges: Vec<Merge>,
    /// Leaf indices left to right as drawn
    pub order: Vec<usize>,
}

impl Dendrogram {
    /// Height of the root merge, 0 for fewer than two leaves
    pub fn max_height(&self) -> f64 {
        self.merges.last().map_or(0.0, |m| m.height)
    }

    /// Position of every node (leaves and merges) along the leaf axis.
    ///
    /// Leaf `order[k]` sits at `k`; a merge sits halfway between its children.
    pub fn node_positions(&self) -> Vec<f64> {
        let mut positions = vec![0.0; self.n_leaves + self.merges.len()];
        for (slot, &leaf) in self.order.iter().enumerate() {
            positions[leaf] = slot as f64;
        }
        for (k, merge) in self.merges.iter().enumerate() {
            positions[self.n_leaves + k] = (positions[merge.left] + positions[merge.right]) / 2.0;
        }
        positions
    }

    /// Height of a node, 0 for leaves
    pub fn node_height(&self, node: usize) -> f64 {
        if node < self.n_leaves {
            0.0
        } else {
            self.merges[node - self.n_leaves].height
        }
    }
}

fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Clusters the rows of `data` with average linkage on Euclidean distance.
///
/// Ties are broken by the lowest slot pair, which makes the result
/// deterministic for identical rows.
pub fn average_linkage(data: &Array2<f64>) -> Dendrogram {
    let n = data.nrows();
    if n == 0 {
        return Dendrogram::default();
    }

    let mut dist = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(data.row(i), data.row(j));
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }

    // slot i holds cluster `node[i]` of `size[i]` leaves while `alive[i]`
    let mut node: Vec<usize> = (0..n).collect();
    let mut size = vec![1usize; n];
    let mut alive = vec![true; n];
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    for step in 0..n.saturating_sub(1) {
        let mut best: Option<(usize, usize, f64)> = None;
        for a in (0..n).filter(|&a| alive[a]) {
            for b in ((a + 1)..n).filter(|&b| alive[b]) {
                if best.map_or(true, |(_, _, d)| dist[[a, b]] < d) {
                    best = Some((a, b, dist[[a, b]]));
                }
            }
        }
        let Some((a, b, height)) = best else { break };

        let (size_a, size_b) = (size[a] as f64, size[b] as f64);
        for k in (0..n).filter(|&k| alive[k] && k != a && k != b) {
            let d = (size_a * dist[[a, k]] + size_b * dist[[b, k]]) / (size_a + size_b);
            dist[[a, k]] = d;
            dist[[k, a]] = d;
        }

        merges.push(Merge {
            left: node[a],
            right: node[b],
            height,
            size: size[a] + size[b],
        });
        node[a] = n + step;
        size[a] += size[b];
        alive[b] = false;
    }

    let order = leaf_order(n, &merges);
    Dendrogram {
        n_leaves: n,
        merges,
        order,
    }
}

fn leaf_order(n: usize, merges: &[Merge]) -> Vec<usize> {
    if merges.is_empty() {
        return (0..n).collect();
    }

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![n + merges.len() - 1];
    while let Some(id) = stack.pop() {
        if id < n {
            order.push(id);
        } else {
            let merge = &merges[id - n];
            stack.push(merge.right);
            stack.push(merge.left);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_row() {
        let dendro = average_linkage(&array![[1.0, 0.0]]);
        assert_eq!(dendro.order, vec![0]);
        assert!(dendro.merges.is_empty());
        assert_eq!(dendro.max_height(), 0.0);
    }

    #[test]
    fn test_empty() {
        let dendro = average_linkage(&Array2::<f64>::zeros((0, 3)));
        assert!(dendro.order.is_empty());
    }

    #[test]
    fn test_groups_similar_rows() {
        // rows 0 and 2 are close, rows 1 and 3 are close
        let data = array![[0.0, 0.0], [10.0, 10.0], [0.1, 0.0], [10.0, 10.1]];
        let dendro = average_linkage(&data);

        assert_eq!(dendro.merges.len(), 3);
        assert_eq!(dendro.order.len(), 4);
        let pos = |leaf: usize| dendro.order.iter().position(|&x| x == leaf).unwrap();
        assert_eq!((pos(0) as i64 - pos(2) as i64).abs(), 1);
        assert_eq!((pos(1) as i64 - pos(3) as i64).abs(), 1);

        // the root joins the two pairs
        let root = dendro.merges.last().unwrap();
        assert_eq!(root.size, 4);
        assert!(root.height > 10.0);
        for i in 1..dendro.merges.len() {
            assert!(dendro.merges[i].height >= dendro.merges[i - 1].height);
        }
    }

    #[test]
    fn test_average_linkage_distance() {
        // 1-D points 0, 1, 5: {0,1} merge at 1, then {0,1}-5 averages 5 and 4
        let data = array![[0.0], [1.0], [5.0]];
        let dendro = average_linkage(&data);
        assert!((dendro.merges[0].height - 1.0).abs() < 1e-12);
        assert!((dendro.merges[1].height - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_node_positions() {
        let data = array![[0.0], [1.0], [5.0]];
        let dendro = average_linkage(&data);
        let positions = dendro.node_positions();
        assert_eq!(positions.len(), 5);
        // first merge sits between leaves 0 and 1
        assert!((positions[3] - 0.5).abs() < 1e-12);
    }
}
