use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::priority_queue::PriorityQueue;
use crate::alphabet::Alphabet;
use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;
use crate::error::{BzError, Result};
use crate::tools::freq_count::freqs;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum NodeData {
    /// Arena indices of the left (bit 0) and right (bit 1) children.
    Kids(usize, usize),
    Leaf(u16),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: u64,
    pub parent: Option<usize>,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new node
    pub fn new(weight: u64, node_data: NodeData) -> Node {
        Node {
            weight,
            parent: None,
            node_data,
        }
    }
}

/// Huffman tree stored as an arena. Every node is owned by the arena and refers to its
/// children and parent by index.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build the tree from a frequency table indexed by symbol.
    ///
    /// Leaves go into the queue in ascending symbol order, so the same table always yields the
    /// same tree. A decoder holding the table can rebuild exactly the encoder's tree.
    /// An empty table has no root and fails with `EmptyQueue`.
    pub fn from_freqs(freqs: &[u32]) -> Result<Self> {
        let mut nodes: Vec<Node> = Vec::with_capacity(freqs.len() * 2);
        let mut queue = PriorityQueue::with_capacity(freqs.len(), |a: &(u64, usize), b: &(u64, usize)| {
            a.0 < b.0
        });

        for (symbol, &f) in freqs.iter().enumerate().filter(|(_, &f)| f > 0) {
            nodes.push(Node::new(f as u64, NodeData::Leaf(symbol as u16)));
            queue.insert((f as u64, nodes.len() - 1));
        }

        // Pull off the two lightest nodes and join them until one is left
        while queue.len() > 1 {
            let (left_weight, left) = queue.extract_min()?;
            let (right_weight, right) = queue.extract_min()?;
            let parent = nodes.len();
            nodes[left].parent = Some(parent);
            nodes[right].parent = Some(parent);
            nodes.push(Node::new(
                left_weight + right_weight,
                NodeData::Kids(left, right),
            ));
            queue.insert((left_weight + right_weight, parent));
        }

        let (_, root) = queue.extract_min()?;
        trace!("Huffman tree has {} nodes", nodes.len());
        Ok(Self { nodes, root })
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges between a node and the root, found by following parent links.
    pub fn depth(&self, mut idx: usize) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.nodes[idx].parent {
            depth += 1;
            idx = parent;
        }
        depth
    }

    /// Leaves as (symbol, weight) in arena order, which is ascending symbol order.
    pub fn leaves(&self) -> Vec<(u16, u64)> {
        self.nodes
            .iter()
            .filter_map(|n| match n.node_data {
                NodeData::Leaf(s) => Some((s, n.weight)),
                NodeData::Kids(..) => None,
            })
            .collect()
    }
}

/// Count the symbols plus one eob, then build the tree.
pub fn build_tree(symbols: &[u16], alphabet: &Alphabet) -> Result<HuffmanTree> {
    let mut counts = freqs(symbols, alphabet.width())?;
    counts[alphabet.eob() as usize] += 1;
    HuffmanTree::from_freqs(&counts)
}

/// A codeword: the low `len` bits of `bits`, first bit highest.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct Codeword {
    pub bits: u64,
    pub len: u8,
}

impl Codeword {
    fn push(self, bit: bool) -> Self {
        Self {
            bits: self.bits << 1 | bit as u64,
            len: self.len + 1,
        }
    }

    pub fn is_prefix_of(&self, other: &Codeword) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }
}

pub type CodeTable = FxHashMap<u16, Codeword>;

/// Walk the tree from the root, 0 for each left edge and 1 for each right edge.
/// A single leaf tree gets the one bit code 0.
pub fn derive_code_table(tree: &HuffmanTree) -> CodeTable {
    let mut table = CodeTable::default();

    if let NodeData::Leaf(symbol) = tree.node(tree.root()).node_data {
        table.insert(symbol, Codeword { bits: 0, len: 1 });
        return table;
    }

    let mut stack = vec![(tree.root(), Codeword::default())];
    while let Some((idx, code)) = stack.pop() {
        match tree.node(idx).node_data {
            NodeData::Kids(left, right) => {
                stack.push((right, code.push(true)));
                stack.push((left, code.push(false)));
            }
            NodeData::Leaf(symbol) => {
                debug_assert!(code.len <= 64);
                debug_assert_eq!(code.len as usize, tree.depth(idx));
                table.insert(symbol, code);
            }
        }
    }
    debug!(
        "{} codes, longest is {} bits",
        table.len(),
        table.values().map(|c| c.len).max().unwrap_or(0)
    );
    table
}

/// Encode the symbols followed by the eob symbol. The last byte is padded with zeros.
pub fn huf_encode(symbols: &[u16], table: &CodeTable, alphabet: &Alphabet) -> Result<Vec<u8>> {
    let eob = alphabet.eob();
    let mut bw = BitWriter::new(symbols.len() / 2 + 1);

    for (position, &symbol) in symbols.iter().enumerate() {
        if symbol == eob {
            return Err(BzError::DuplicateMarker { symbol, position });
        }
        let code = table.get(&symbol).ok_or(BzError::UnknownSymbol(symbol))?;
        bw.out_bits(code.bits, code.len);
    }
    let code = table.get(&eob).ok_or(BzError::UnknownSymbol(eob))?;
    bw.out_bits(code.bits, code.len);

    let bits = bw.bit_len();
    trace!(
        "Huffman: {} symbols in {} bits, {} padding bits",
        symbols.len() + 1,
        bits,
        (8 - bits % 8) % 8
    );
    Ok(bw.finish())
}

/// Decode symbols until the eob leaf is reached. Bits after it are padding and are ignored.
pub fn huf_decode(data: &[u8], tree: &HuffmanTree, alphabet: &Alphabet) -> Result<Vec<u16>> {
    let eob = alphabet.eob();
    let mut br = BitReader::new(data);
    let mut out = vec![];

    // A single leaf has the one bit code 0
    if let NodeData::Leaf(symbol) = tree.node(tree.root()).node_data {
        loop {
            match br.bit() {
                None => return Err(BzError::TruncatedStream),
                Some(0) if symbol == eob => return Ok(out),
                Some(0) => out.push(symbol),
                Some(_) => return Err(BzError::UnknownCodeword(br.position() - 1)),
            }
        }
    }

    let mut node = tree.root();
    loop {
        let bit = br.bool_bit().ok_or(BzError::TruncatedStream)?;
        node = match tree.node(node).node_data {
            NodeData::Kids(left, right) => {
                if bit {
                    right
                } else {
                    left
                }
            }
            NodeData::Leaf(_) => return Err(BzError::UnknownCodeword(br.position() - 1)),
        };
        if let NodeData::Leaf(symbol) = tree.node(node).node_data {
            if symbol == eob {
                return Ok(out);
            }
            out.push(symbol);
            node = tree.root();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn syms(s: &str) -> Vec<u16> {
        s.bytes().map(u16::from).collect()
    }

    #[test]
    fn known_tree_test() {
        // a:1 b:1 c:2. a and b merge first, then c is extracted before the new node.
        let mut f = vec![0_u32; 100];
        f[b'a' as usize] = 1;
        f[b'b' as usize] = 1;
        f[b'c' as usize] = 2;
        let tree = HuffmanTree::from_freqs(&f).unwrap();
        assert_eq!(tree.len(), 5);
        let table = derive_code_table(&tree);
        assert_eq!(table[&(b'c' as u16)], Codeword { bits: 0b0, len: 1 });
        assert_eq!(table[&(b'a' as u16)], Codeword { bits: 0b10, len: 2 });
        assert_eq!(table[&(b'b' as u16)], Codeword { bits: 0b11, len: 2 });
        assert_eq!(tree.leaves(), vec![(97, 1), (98, 1), (99, 2)]);
        assert_eq!(tree.node(tree.root()).weight, 4);
    }

    #[test]
    fn depth_matches_code_length_test() {
        let alphabet = Alphabet::default();
        let tree = build_tree(&syms("abracadabra alakazam"), &alphabet).unwrap();
        let table = derive_code_table(&tree);
        for idx in 0..tree.len() {
            if let NodeData::Leaf(s) = tree.node(idx).node_data {
                assert_eq!(tree.depth(idx), table[&s].len as usize);
            }
        }
    }

    #[test]
    fn empty_table_test() {
        assert!(matches!(
            HuffmanTree::from_freqs(&[0, 0, 0]),
            Err(BzError::EmptyQueue)
        ));
        assert!(matches!(HuffmanTree::from_freqs(&[]), Err(BzError::EmptyQueue)));
    }

    #[test]
    fn eob_only_test() {
        let alphabet = Alphabet::default();
        let tree = build_tree(&[], &alphabet).unwrap();
        assert_eq!(tree.len(), 1);
        let table = derive_code_table(&tree);
        assert_eq!(table[&259], Codeword { bits: 0, len: 1 });
        let bits = huf_encode(&[], &table, &alphabet).unwrap();
        assert_eq!(bits, vec![0]);
        assert!(huf_decode(&bits, &tree, &alphabet).unwrap().is_empty());
    }

    #[test]
    fn single_leaf_tree_test() {
        // A tree with one leaf that is not the eob still gets a one bit code
        let alphabet = Alphabet::default();
        let mut f = vec![0_u32; alphabet.width()];
        f[7] = 5;
        let tree = HuffmanTree::from_freqs(&f).unwrap();
        let table = derive_code_table(&tree);
        assert_eq!(table[&7], Codeword { bits: 0, len: 1 });
        assert!(matches!(
            huf_decode(&[0b0010_0000], &tree, &alphabet),
            Err(BzError::UnknownCodeword(2))
        ));
        assert!(matches!(
            huf_decode(&[0], &tree, &alphabet),
            Err(BzError::TruncatedStream)
        ));
    }

    #[test]
    fn single_distinct_symbol_round_trip_test() {
        let alphabet = Alphabet::default();
        let input = vec![42_u16; 1000];
        let tree = build_tree(&input, &alphabet).unwrap();
        let table = derive_code_table(&tree);
        assert_eq!(table.len(), 2);
        let bits = huf_encode(&input, &table, &alphabet).unwrap();
        // 1001 one bit codes fit in 126 bytes
        assert_eq!(bits.len(), 126);
        assert_eq!(huf_decode(&bits, &tree, &alphabet).unwrap(), input);
    }

    #[test]
    fn text_round_trip_test() {
        let alphabet = Alphabet::default();
        let input = syms("this is an example of a huffman tree");
        let tree = build_tree(&input, &alphabet).unwrap();
        let table = derive_code_table(&tree);
        let bits = huf_encode(&input, &table, &alphabet).unwrap();
        assert!(bits.len() < input.len());
        assert_eq!(huf_decode(&bits, &tree, &alphabet).unwrap(), input);
    }

    #[test]
    fn rebuild_from_freqs_test() {
        // A decoder with only the frequency table rebuilds the same tree
        let alphabet = Alphabet::default();
        let input = syms("mississippi river banks");
        let tree = build_tree(&input, &alphabet).unwrap();
        let bits = huf_encode(&input, &derive_code_table(&tree), &alphabet).unwrap();

        let mut f = vec![0_u32; alphabet.width()];
        for (s, w) in tree.leaves() {
            f[s as usize] = w as u32;
        }
        let rebuilt = HuffmanTree::from_freqs(&f).unwrap();
        assert_eq!(derive_code_table(&rebuilt), derive_code_table(&tree));
        assert_eq!(huf_decode(&bits, &rebuilt, &alphabet).unwrap(), input);
    }

    #[test]
    fn prefix_free_test() {
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..50 {
            let f = (0..300)
                .map(|_| if rng.gen_bool(0.3) { rng.gen_range(1..1000) } else { 0 })
                .collect::<Vec<u32>>();
            let Ok(tree) = HuffmanTree::from_freqs(&f) else {
                continue;
            };
            let table = derive_code_table(&tree);
            let codes = table.values().collect::<Vec<_>>();
            for (i, a) in codes.iter().enumerate() {
                for (j, b) in codes.iter().enumerate() {
                    if i != j {
                        assert!(!a.is_prefix_of(b));
                    }
                }
            }
            // A full binary tree meets the Kraft inequality with equality
            if codes.len() > 1 {
                let kraft: f64 = codes.iter().map(|c| 0.5_f64.powi(c.len as i32)).sum();
                assert!((kraft - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn never_worse_than_bytes_test() {
        let mut rng = StdRng::seed_from_u64(8);
        for distinct in [2_usize, 3, 17, 128, 256] {
            let f = (0..distinct)
                .map(|_| rng.gen_range(1..5000))
                .collect::<Vec<u32>>();
            let table = derive_code_table(&HuffmanTree::from_freqs(&f).unwrap());
            let total: u64 = f
                .iter()
                .enumerate()
                .map(|(s, &c)| c as u64 * table[&(s as u16)].len as u64)
                .sum();
            let raw: u64 = f.iter().map(|&c| c as u64 * 8).sum();
            assert!(total <= raw);
        }
    }

    #[test]
    fn random_round_trip_test() {
        let alphabet = Alphabet::default();
        let mut rng = StdRng::seed_from_u64(1234);
        for len in [0, 1, 2, 3, 10, 255, 4096] {
            let range = rng.gen_range(1..=259_u16);
            let input = (0..len)
                .map(|_| rng.gen_range(0..range))
                .collect::<Vec<u16>>();
            let tree = build_tree(&input, &alphabet).unwrap();
            let table = derive_code_table(&tree);
            let bits = huf_encode(&input, &table, &alphabet).unwrap();
            assert_eq!(huf_decode(&bits, &tree, &alphabet).unwrap(), input);
        }
    }

    #[test]
    fn encode_errors_test() {
        let alphabet = Alphabet::default();
        let tree = build_tree(&syms("abc"), &alphabet).unwrap();
        let table = derive_code_table(&tree);
        assert!(matches!(
            huf_encode(&syms("abz"), &table, &alphabet),
            Err(BzError::UnknownSymbol(122))
        ));
        assert!(matches!(
            huf_encode(&[97, 259, 98], &table, &alphabet),
            Err(BzError::DuplicateMarker {
                symbol: 259,
                position: 1
            })
        ));
    }

    #[test]
    fn truncated_stream_test() {
        let alphabet = Alphabet::default();
        let input = syms("a longer sentence so the stream spans several bytes");
        let tree = build_tree(&input, &alphabet).unwrap();
        let bits = huf_encode(&input, &derive_code_table(&tree), &alphabet).unwrap();
        assert!(matches!(
            huf_decode(&bits[..bits.len() - 1], &tree, &alphabet),
            Err(BzError::TruncatedStream)
        ));
    }
}
