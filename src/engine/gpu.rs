//! GPU execution engine.
//!
//! ## Purpose
//!
//! This module provides the device backend: an elementwise transform kernel
//! and a hierarchical workgroup tree reduction driven by a multi-pass loop.
//! Each pass loads a chunk of the buffer into workgroup shared memory,
//! performs an in-place pairwise-halving reduction synchronized by barriers,
//! and emits one partial result per workgroup; the driver re-launches passes
//! over the shrinking partial-result buffer until a single aggregate remains,
//! then folds in the caller's initial value on the host.
//!
//! ## Design notes
//!
//! * **Specialized kernels**: WGSL is generated from a template specialized
//!   by element type, combine expression, and map expression; the map is
//!   applied only on the first pass so partial results are never re-mapped.
//! * **Identity padding**: lanes past the live data size load the operator's
//!   identity into scratch, so partial trailing workgroups never read
//!   uninitialized scratch and ceil-division group counts drop no tail
//!   elements.
//! * **Ping-pong buffers**: each pass reads the front buffer and writes one
//!   partial per workgroup into the back buffer, then the roles swap. Every
//!   buffer position has exactly one writer per pass; workgroups need no
//!   visibility into each other's results until the driver reads them back.
//! * **Synchronous passes**: one queue submission per pass, with a blocking
//!   wait before deciding whether another pass is needed. Buffers are
//!   device-owned for the duration of a pass.
//! * **Explicit failures**: adapter/device acquisition failures surface as
//!   `DeviceUnavailable`, shader and pipeline validation as `KernelBuild`,
//!   and submission/readback faults as `KernelExecution`. Ranges whose first
//!   pass would exceed the device's per-dimension dispatch limit are rejected
//!   up front as `UnsupportedOnDevice`. Nothing degrades silently to a
//!   default value, and no device fault escapes as a panic: each pass runs
//!   inside a validation error scope.
//!
//! ## Invariants
//!
//! * A group of size `2^k` reduces in exactly `k` barrier-synchronized
//!   halving steps.
//! * An empty range performs no device work.
//! * The executor is created once per thread and reused across calls;
//!   compiled pipelines are cached per (element type, combine, map)
//!   specialization.

// External dependencies
use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use wgpu::util::{BufferInitDescriptor, DeviceExt};
use wgpu::{
    BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType, BufferDescriptor, BufferUsages,
    CommandEncoderDescriptor, ComputePassDescriptor, ComputePipeline, ComputePipelineDescriptor,
    Device, DeviceDescriptor, ErrorFilter, Instance, InstanceDescriptor, MapMode,
    PipelineLayoutDescriptor, PollType, Queue, RequestAdapterOptions, ShaderModuleDescriptor,
    ShaderSource, ShaderStages,
};

// Internal dependencies
use crate::primitives::element::Element;
use crate::primitives::errors::ParafoldError;
use crate::primitives::ops::{CombineOp, MapOp};

/// Work-items per workgroup; also the workgroup scratch capacity.
pub const WORKGROUP_SIZE: u32 = 256;

// -----------------------------------------------------------------------------
// Shader Template (WGSL)
// -----------------------------------------------------------------------------
const SHADER_TEMPLATE: &str = r#"
struct Params {
    n: u32,
    identity: {{elem}},
    pad0: u32,
    pad1: u32,
}

@group(0) @binding(0) var<storage, read> src: array<{{elem}}>;
@group(0) @binding(1) var<storage, read_write> dst: array<{{elem}}>;
@group(0) @binding(2) var<uniform> params: Params;

var<workgroup> scratch: array<{{elem}}, {{wg}}>;

fn combine(a: {{elem}}, b: {{elem}}) -> {{elem}} {
    return {{combine}};
}

fn map_op(x: {{elem}}) -> {{elem}} {
    return {{map}};
}

// -----------------------------------------------------------------------------
// Kernel 1: Elementwise transform
// -----------------------------------------------------------------------------
@compute @workgroup_size({{wg}})
fn transform_kernel(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let i = global_id.x;
    if (i >= params.n) {
        return;
    }
    dst[i] = map_op(src[i]);
}

// -----------------------------------------------------------------------------
// Pairwise-halving tree reduction over workgroup scratch.
// Lanes past the live data size hold the identity, so partial trailing
// groups reduce correctly.
// -----------------------------------------------------------------------------
fn tree_reduce(value: {{elem}}, local_id: u32, group_id: u32) {
    scratch[local_id] = value;
    workgroupBarrier();

    for (var offset = {{wg_half}}u; offset > 0u; offset >>= 1u) {
        if (local_id < offset) {
            scratch[local_id] = combine(scratch[local_id], scratch[local_id + offset]);
        }
        workgroupBarrier();
    }

    if (local_id == 0u) {
        dst[group_id] = scratch[0u];
    }
}

// -----------------------------------------------------------------------------
// Kernel 2: First reduction pass (applies the map)
// -----------------------------------------------------------------------------
@compute @workgroup_size({{wg}})
fn reduce_first(
    @builtin(global_invocation_id) global_id: vec3<u32>,
    @builtin(local_invocation_id) local_id: vec3<u32>,
    @builtin(workgroup_id) workgroup_id: vec3<u32>,
) {
    var value = params.identity;
    if (global_id.x < params.n) {
        value = map_op(src[global_id.x]);
    }
    tree_reduce(value, local_id.x, workgroup_id.x);
}

// -----------------------------------------------------------------------------
// Kernel 3: Subsequent reduction passes (partials are already mapped)
// -----------------------------------------------------------------------------
@compute @workgroup_size({{wg}})
fn reduce_next(
    @builtin(global_invocation_id) global_id: vec3<u32>,
    @builtin(local_invocation_id) local_id: vec3<u32>,
    @builtin(workgroup_id) workgroup_id: vec3<u32>,
) {
    var value = params.identity;
    if (global_id.x < params.n) {
        value = src[global_id.x];
    }
    tree_reduce(value, local_id.x, workgroup_id.x);
}
"#;

fn shader_source(elem: &str, combine: CombineOp, map: MapOp) -> String {
    SHADER_TEMPLATE
        .replace("{{elem}}", elem)
        .replace("{{combine}}", combine.wgsl_expr())
        .replace("{{map}}", map.wgsl_expr())
        .replace("{{wg_half}}", &(WORKGROUP_SIZE / 2).to_string())
        .replace("{{wg}}", &WORKGROUP_SIZE.to_string())
}

fn params_bytes<T: Element>(n: u32, identity: T) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    bytes[0..4].copy_from_slice(&n.to_le_bytes());
    bytes[4..8].copy_from_slice(bytemuck::bytes_of(&identity));
    bytes
}

fn device_type<T: Element>() -> Result<&'static str, ParafoldError> {
    T::WGSL_TYPE.ok_or(ParafoldError::UnsupportedOnDevice(
        "element type without a device representation",
    ))
}

fn device_len(len: usize) -> Result<u32, ParafoldError> {
    u32::try_from(len).map_err(|_| {
        ParafoldError::UnsupportedOnDevice("ranges longer than u32::MAX elements")
    })
}

// -----------------------------------------------------------------------------
// Thread-Local Executor
// -----------------------------------------------------------------------------

thread_local! {
    static THREAD_EXECUTOR: RefCell<Option<Result<GpuExecutor, ParafoldError>>> =
        const { RefCell::new(None) };
}

fn with_executor<R>(
    f: impl FnOnce(&GpuExecutor) -> Result<R, ParafoldError>,
) -> Result<R, ParafoldError> {
    THREAD_EXECUTOR.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(pollster::block_on(GpuExecutor::new()));
        }
        match slot.as_ref() {
            Some(Ok(executor)) => f(executor),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ParafoldError::DeviceUnavailable(
                "executor initialization did not run".into(),
            )),
        }
    })
}

// -----------------------------------------------------------------------------
// Executor
// -----------------------------------------------------------------------------

/// Device and queue handle, created once per thread.
pub struct GpuExecutor {
    device: Device,
    queue: Queue,
    max_groups: u32,
    pipelines: RefCell<HashMap<PipelineKey, Rc<ShaderPipelines>>>,
}

/// Shader specialization: element type, combine expression, map expression.
type PipelineKey = (&'static str, CombineOp, MapOp);

struct ShaderPipelines {
    transform: ComputePipeline,
    reduce_first: ComputePipeline,
    reduce_next: ComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl GpuExecutor {
    async fn new() -> Result<Self, ParafoldError> {
        let instance = Instance::new(&InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&RequestAdapterOptions::default())
            .await
            .map_err(|e| ParafoldError::DeviceUnavailable(format!("no compatible adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&DeviceDescriptor::default())
            .await
            .map_err(|e| {
                ParafoldError::DeviceUnavailable(format!("device request failed: {e}"))
            })?;

        let max_groups = device.limits().max_compute_workgroups_per_dimension;
        Ok(Self {
            device,
            queue,
            max_groups,
            pipelines: RefCell::new(HashMap::new()),
        })
    }

    /// Reject ranges whose first pass would need more workgroups than the
    /// device allows along one dispatch dimension.
    fn check_dispatch(&self, n: u32) -> Result<(), ParafoldError> {
        let capacity = u64::from(self.max_groups) * u64::from(WORKGROUP_SIZE);
        if u64::from(n) > capacity {
            return Err(ParafoldError::UnsupportedOnDevice(
                "ranges exceeding the device dispatch limit",
            ));
        }
        Ok(())
    }

    /// Fetch the pipelines for a shader specialization, building and caching
    /// them on first use.
    fn pipelines_for(
        &self,
        elem: &'static str,
        combine: CombineOp,
        map: MapOp,
    ) -> Result<Rc<ShaderPipelines>, ParafoldError> {
        let key = (elem, combine, map);
        if let Some(pipelines) = self.pipelines.borrow().get(&key) {
            return Ok(Rc::clone(pipelines));
        }
        let built = Rc::new(self.build_pipelines(&shader_source(elem, combine, map))?);
        self.pipelines.borrow_mut().insert(key, Rc::clone(&built));
        Ok(built)
    }

    /// Build the specialized shader module and its three pipelines, catching
    /// validation failures via an error scope.
    fn build_pipelines(&self, source: &str) -> Result<ShaderPipelines, ParafoldError> {
        self.device.push_error_scope(ErrorFilter::Validation);

        let shader = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some("parafold kernels"),
            source: ShaderSource::Wgsl(source.into()),
        });

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&BindGroupLayoutDescriptor {
                    label: Some("ParafoldBindGroupLayout"),
                    entries: &[
                        BindGroupLayoutEntry {
                            binding: 0,
                            visibility: ShaderStages::COMPUTE,
                            ty: BindingType::Buffer {
                                ty: BufferBindingType::Storage { read_only: true },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        BindGroupLayoutEntry {
                            binding: 1,
                            visibility: ShaderStages::COMPUTE,
                            ty: BindingType::Buffer {
                                ty: BufferBindingType::Storage { read_only: false },
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                        BindGroupLayoutEntry {
                            binding: 2,
                            visibility: ShaderStages::COMPUTE,
                            ty: BindingType::Buffer {
                                ty: BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                        },
                    ],
                });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some("ParafoldPipelineLayout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let make = |entry: &str| {
            self.device
                .create_compute_pipeline(&ComputePipelineDescriptor {
                    label: Some(entry),
                    layout: Some(&pipeline_layout),
                    module: &shader,
                    entry_point: Some(entry),
                    compilation_options: Default::default(),
                    cache: None,
                })
        };

        let pipelines = ShaderPipelines {
            transform: make("transform_kernel"),
            reduce_first: make("reduce_first"),
            reduce_next: make("reduce_next"),
            bind_group_layout,
        };

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ParafoldError::KernelBuild(error.to_string()));
        }

        Ok(pipelines)
    }

    fn bind(&self, pipelines: &ShaderPipelines, src: &Buffer, dst: &Buffer, params: &Buffer) -> wgpu::BindGroup {
        self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("ParafoldBindGroup"),
            layout: &pipelines.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: src.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: dst.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
        })
    }

    /// Record and submit one kernel launch, then block until the queue
    /// signals completion. The whole pass runs inside a validation error
    /// scope so dispatch faults surface as errors instead of reaching the
    /// uncaptured-error handler.
    fn run_pass(
        &self,
        pipeline: &ComputePipeline,
        bind_group: &wgpu::BindGroup,
        groups: u32,
    ) -> Result<(), ParafoldError> {
        self.device.push_error_scope(ErrorFilter::Validation);

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("ParafoldPass"),
            });
        {
            let mut pass = encoder.begin_compute_pass(&ComputePassDescriptor::default());
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(groups, 1, 1);
        }
        self.queue.submit(Some(encoder.finish()));
        self.wait()?;

        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(ParafoldError::KernelExecution(error.to_string()));
        }
        Ok(())
    }

    fn wait(&self) -> Result<(), ParafoldError> {
        self.device
            .poll(PollType::Wait)
            .map_err(|e| ParafoldError::KernelExecution(format!("device poll failed: {e}")))?;
        Ok(())
    }

    /// Copy `count` elements from a device buffer into host memory.
    fn read_elements<T: Element>(
        &self,
        buffer: &Buffer,
        count: usize,
    ) -> Result<Vec<T>, ParafoldError> {
        let size = (count * mem::size_of::<T>()) as u64;
        let staging = self.device.create_buffer(&BufferDescriptor {
            label: Some("ParafoldStaging"),
            size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("ParafoldReadback"),
            });
        encoder.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        slice.map_async(MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.wait()?;

        match pollster::block_on(rx.receive()) {
            Some(Ok(())) => {
                let data = slice.get_mapped_range();
                let values = bytemuck::cast_slice(&data).to_vec();
                drop(data);
                staging.unmap();
                Ok(values)
            }
            _ => Err(ParafoldError::KernelExecution(
                "staging buffer mapping failed".into(),
            )),
        }
    }
}

// -----------------------------------------------------------------------------
// Entry Points
// -----------------------------------------------------------------------------

/// Apply `map` elementwise on the device.
pub fn transform<T: Element>(
    input: &[T],
    output: &mut [T],
    map: MapOp,
) -> Result<(), ParafoldError> {
    debug_assert_eq!(input.len(), output.len());
    let elem = device_type::<T>()?;
    if input.is_empty() {
        return Ok(());
    }
    let n = device_len(input.len())?;

    with_executor(|exec| {
        exec.check_dispatch(n)?;
        // The template always carries a combine expression; the transform
        // kernel does not reference it.
        let pipelines = exec.pipelines_for(elem, CombineOp::Sum, map)?;

        let src = exec.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("TransformInput"),
            contents: bytemuck::cast_slice(input),
            usage: BufferUsages::STORAGE,
        });
        let dst = exec.device.create_buffer(&BufferDescriptor {
            label: Some("TransformOutput"),
            size: (input.len() * mem::size_of::<T>()) as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let params = exec.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("TransformParams"),
            contents: &params_bytes::<T>(n, T::zero()),
            usage: BufferUsages::UNIFORM,
        });

        let bind_group = exec.bind(&pipelines, &src, &dst, &params);
        exec.run_pass(
            &pipelines.transform,
            &bind_group,
            n.div_ceil(WORKGROUP_SIZE),
        )?;

        let values = exec.read_elements::<T>(&dst, input.len())?;
        output.copy_from_slice(&values);
        Ok(())
    })
}

/// Multi-pass tree reduction of `map(x)` on the device, folding `init` in
/// on the host after the final pass.
pub fn transform_reduce<T: Element>(
    input: &[T],
    init: T,
    combine: CombineOp,
    map: MapOp,
) -> Result<T, ParafoldError> {
    let elem = device_type::<T>()?;
    if input.is_empty() {
        return Ok(init);
    }
    let n = device_len(input.len())?;
    let identity: T = combine.identity();

    with_executor(|exec| {
        exec.check_dispatch(n)?;
        let pipelines = exec.pipelines_for(elem, combine, map)?;

        let front_buffer = exec.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("ReduceFront"),
            contents: bytemuck::cast_slice(input),
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
        });
        let partial_count = n.div_ceil(WORKGROUP_SIZE).max(1);
        let back_buffer = exec.device.create_buffer(&BufferDescriptor {
            label: Some("ReduceBack"),
            size: (partial_count as u64) * mem::size_of::<T>() as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let params = exec.device.create_buffer(&BufferDescriptor {
            label: Some("ReduceParams"),
            size: 16,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut front = &front_buffer;
        let mut back = &back_buffer;
        let mut data_size = n;
        let mut first = true;

        // At least one pass always runs, so the map is applied even when
        // the range holds a single element.
        loop {
            let groups = data_size.div_ceil(WORKGROUP_SIZE);
            exec.queue
                .write_buffer(&params, 0, &params_bytes(data_size, identity));

            let bind_group = exec.bind(&pipelines, front, back, &params);
            let pipeline = if first {
                &pipelines.reduce_first
            } else {
                &pipelines.reduce_next
            };
            exec.run_pass(pipeline, &bind_group, groups)?;

            data_size = groups;
            mem::swap(&mut front, &mut back);
            first = false;
            if data_size <= 1 {
                break;
            }
        }

        let aggregate = exec.read_elements::<T>(front, 1)?[0];
        Ok(combine.apply(init, aggregate))
    })
}
