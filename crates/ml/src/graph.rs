use crate::recorder::Recorder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EOp {
    Add,
    Sub,
    Mul,
    MulScalar,
    MatMul,
    AddBroadcast,
    Relu,
    Exp,
    Clamp,
    Min,
    ReduceSum,
    ReduceMean,
    LogSoftmax,
    Gather,
}

/// One recorded op. `a` and `b` are operand tensor ids (unary ops carry a
/// parameter tensor, or repeat `a`, in `b`); `out` is the result id.
#[derive(Clone, Debug)]
pub struct Node {
    pub op: EOp,
    pub a: usize,
    pub b: usize,
    pub out: usize,
}

/// Recorder for forward passes that are never differentiated.
#[derive(Default)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Recorder for Graph {
    fn record(&mut self, node: Node) {
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Graph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }
}
